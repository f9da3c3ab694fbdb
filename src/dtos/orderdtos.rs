use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitDeliveryDto {
    #[validate(length(max = 5000, message = "Delivery message must be at most 5000 characters"))]
    pub message: Option<String>,

    pub attachment_urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestRevisionDto {
    #[validate(length(
        min = 5,
        max = 2000,
        message = "Revision note must be between 5 and 2000 characters"
    ))]
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CancelOrderDto {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}
