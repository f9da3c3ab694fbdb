use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ordermodel::OrderStatus;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "dispute_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    InReview,
    Resolved,
    Closed,
}

impl DisputeStatus {
    pub fn to_str(&self) -> &str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::InReview => "in_review",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Closed => "closed",
        }
    }

    /// An order stays frozen at disputed while its dispute is active.
    pub fn is_active(&self) -> bool {
        matches!(self, DisputeStatus::Open | DisputeStatus::InReview)
    }
}

/// What the admin decided should happen to the disputed order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    RefundClient,
    PayFreelancer,
    Split,
    None,
}

impl OrderAction {
    pub fn to_str(&self) -> &str {
        match self {
            OrderAction::RefundClient => "refund_client",
            OrderAction::PayFreelancer => "pay_freelancer",
            OrderAction::Split => "split",
            OrderAction::None => "none",
        }
    }

    /// Terminal order status forced by this action. `None` leaves the order
    /// disputed. A split settlement completes the order; the money side is
    /// settled outside this engine.
    pub fn terminal_order_status(&self) -> Option<OrderStatus> {
        match self {
            OrderAction::RefundClient => Some(OrderStatus::Cancelled),
            OrderAction::PayFreelancer => Some(OrderStatus::Completed),
            OrderAction::Split => Some(OrderStatus::Completed),
            OrderAction::None => None,
        }
    }
}

/// An escalation tied to exactly one order. At most one active dispute may
/// exist per order, enforced by a partial unique index.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Dispute {
    pub id: Uuid,
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub raised_by: Uuid,
    pub reason: String,
    pub description: String,
    pub attachment_urls: Option<Vec<String>>,
    pub status: DisputeStatus,
    pub admin_resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.freelancer_id == user_id
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct DisputeComment {
    pub id: Uuid,
    pub dispute_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_dispute_statuses() {
        assert!(DisputeStatus::Open.is_active());
        assert!(DisputeStatus::InReview.is_active());
        assert!(!DisputeStatus::Resolved.is_active());
        assert!(!DisputeStatus::Closed.is_active());
    }

    #[test]
    fn test_order_action_forces_terminal_status() {
        assert_eq!(
            OrderAction::RefundClient.terminal_order_status(),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(
            OrderAction::PayFreelancer.terminal_order_status(),
            Some(OrderStatus::Completed)
        );
        assert_eq!(
            OrderAction::Split.terminal_order_status(),
            Some(OrderStatus::Completed)
        );
        assert_eq!(OrderAction::None.terminal_order_status(), None);
    }
}
