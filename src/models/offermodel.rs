use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn to_str(&self) -> &str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        }
    }

    /// Accepted and rejected offers never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Accepted | OfferStatus::Rejected)
    }
}

/// A freelancer-authored proposal for one catalog service, awaiting the
/// client's accept or reject. `status` is the source of truth; `order_id`
/// is a derived pointer written in the same transaction that accepts the
/// offer and must agree with `status`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Offer {
    pub id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub status: OfferStatus,
    pub price: BigDecimal,
    pub currency: String,
    pub delivery_time_days: i32,
    pub revisions_included: i32,
    pub scope_of_work: Option<String>,
    pub cancellation_policy: Option<String>,
    // Snapshot of the catalog listing at offer creation time.
    pub service_title: String,
    pub service_description: String,
    pub order_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_not_terminal() {
        assert!(!OfferStatus::Pending.is_terminal());
    }

    #[test]
    fn test_accepted_and_rejected_are_terminal() {
        assert!(OfferStatus::Accepted.is_terminal());
        assert!(OfferStatus::Rejected.is_terminal());
    }
}
