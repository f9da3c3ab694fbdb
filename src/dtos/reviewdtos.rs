use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One of `order_id` and `service_id` is set depending on
/// `is_order_review`; the service re-checks the pairing.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitReviewDto {
    pub order_id: Option<Uuid>,

    pub service_id: Option<Uuid>,

    pub reviewee_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: String,

    pub is_order_review: bool,
}
