use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::disputemodel::{DisputeStatus, OrderAction};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OpenDisputeDto {
    #[validate(length(min = 3, max = 100, message = "Reason must be between 3 and 100 characters"))]
    pub reason: String,

    #[validate(length(
        min = 20,
        max = 5000,
        message = "Description must be between 20 and 5000 characters"
    ))]
    pub description: String,

    pub attachment_urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResolveDisputeDto {
    pub new_status: DisputeStatus,

    #[validate(length(max = 5000, message = "Resolution must be at most 5000 characters"))]
    pub admin_resolution: Option<String>,

    pub order_action: OrderAction,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddCommentDto {
    #[validate(length(min = 1, max = 2000, message = "Comment must be between 1 and 2000 characters"))]
    pub body: String,
}
