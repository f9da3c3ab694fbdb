pub mod audit_service;
pub mod contract_service;
pub mod dispute_service;
pub mod error;
pub mod notification_service;
pub mod offer_service;
pub mod order_service;
pub mod review_service;
