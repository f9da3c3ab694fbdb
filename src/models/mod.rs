pub mod catalogmodel;
pub mod disputemodel;
pub mod offermodel;
pub mod ordermodel;
pub mod reviewmodel;
pub mod usermodel;
