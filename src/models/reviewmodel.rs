use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feedback left by one party about the other. Exactly one of `order_id`
/// and `service_id` is set. `is_client_review` is only meaningful for
/// order reviews: true when the client reviews the freelancer, false for
/// the freelancer's review of the client, which is only accepted once the
/// client review exists.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub is_order_review: bool,
    pub is_client_review: bool,
    pub created_at: DateTime<Utc>,
}

/// Derived aggregate over all reviews received by one user. Recomputed from
/// the review set inside the transaction that inserts a review, never
/// incremented from a stale read.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct RatingSummary {
    pub user_id: Uuid,
    pub average_rating: f64,
    pub review_count: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReviewEligibility {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl ReviewEligibility {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn denied(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}
