use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOfferDto {
    pub service_id: Uuid,

    pub client_id: Uuid,

    pub conversation_id: Option<Uuid>,

    #[validate(range(min = 1, max = 365, message = "Delivery time must be between 1 and 365 days"))]
    pub delivery_time_days: i32,

    #[validate(range(min = 0, max = 20, message = "Included revisions must be between 0 and 20"))]
    pub revisions_included: i32,

    #[validate(length(max = 5000, message = "Scope of work must be at most 5000 characters"))]
    pub scope_of_work: Option<String>,

    #[validate(length(max = 2000, message = "Cancellation policy must be at most 2000 characters"))]
    pub cancellation_policy: Option<String>,

    // Overrides the catalog price when set; must still be positive.
    pub price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RejectOfferDto {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQueryDto {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQueryDto {
    /// Clamped LIMIT/OFFSET pair; page numbering starts at 1.
    pub fn to_limit_offset(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1) * limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let query = PageQueryDto {
            page: None,
            limit: None,
        };
        assert_eq!(query.to_limit_offset(), (20, 0));
    }

    #[test]
    fn test_pagination_clamps_limit_and_page() {
        let query = PageQueryDto {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(query.to_limit_offset(), (100, 0));

        let query = PageQueryDto {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(query.to_limit_offset(), (10, 20));
    }
}
