pub mod catalogdb;
pub mod db;
pub mod disputedb;
pub mod offerdb;
pub mod orderdb;
pub mod reviewdb;
