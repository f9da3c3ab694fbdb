use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingAcceptance,
    InProgress,
    Delivered,
    RevisionRequested,
    Completed,
    Cancelled,
    Disputed,
}

impl OrderStatus {
    pub fn to_str(&self) -> &str {
        match self {
            OrderStatus::PendingAcceptance => "pending_acceptance",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivered => "delivered",
            OrderStatus::RevisionRequested => "revision_requested",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Disputed => "disputed",
        }
    }

    /// No transition is legal out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// States from which a dispute may be opened.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            OrderStatus::InProgress | OrderStatus::Delivered | OrderStatus::RevisionRequested
        )
    }

    /// The full transition table. Disputed orders only move through dispute
    /// resolution, which forces one of the terminal states.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (*self, next) {
            (PendingAcceptance, InProgress) => true,
            (InProgress, Delivered) => true,
            (Delivered, RevisionRequested) => true,
            (RevisionRequested, Delivered) => true,
            (Delivered, Completed) => true,
            (InProgress, Disputed) | (Delivered, Disputed) | (RevisionRequested, Disputed) => true,
            (Disputed, Completed) | (Disputed, Cancelled) => true,
            (from, Cancelled) => !from.is_terminal() && from != Disputed,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Completed,
    Cancelled,
}

impl ContractStatus {
    /// The contract mirrors its order whenever the order goes terminal.
    pub fn mirror_of(order_status: OrderStatus) -> Option<ContractStatus> {
        match order_status {
            OrderStatus::Completed => Some(ContractStatus::Completed),
            OrderStatus::Cancelled => Some(ContractStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "order_event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderEventType {
    /// metadata: { offer_id, order_number, price }
    OrderCreated,
    /// metadata: { deliverable_id, attachment_count }
    DeliverySubmitted,
    /// metadata: { revisions_used, revisions_included }
    RevisionRequested,
    /// metadata: {}
    DeliveryAccepted,
    /// metadata: { reason }
    OrderCancelled,
    /// metadata: { dispute_id, reason }
    DisputeOpened,
    /// metadata: { dispute_id, new_status, order_action }
    DisputeResolved,
}

/// The binding unit of work, created by exactly one offer acceptance.
/// `offer_id` is unique across orders: no offer funds two orders.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub offer_id: Uuid,
    pub status: OrderStatus,
    pub price: BigDecimal,
    pub currency: String,
    pub delivery_time_days: i32,
    pub revisions_included: i32,
    pub revisions_used: i32,
    pub delivery_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub client_ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.freelancer_id == user_id
    }

    pub fn counterparty_of(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.client_id {
            Some(self.freelancer_id)
        } else if user_id == self.freelancer_id {
            Some(self.client_id)
        } else {
            None
        }
    }
}

/// Frozen terms of one order, written once at offer acceptance and never
/// recomputed from the order afterwards.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Contract {
    pub order_id: Uuid,
    pub service_title: String,
    pub service_description: String,
    pub scope_of_work: Option<String>,
    pub price: BigDecimal,
    pub currency: String,
    pub delivery_time_days: i32,
    pub revisions_included: i32,
    pub cancellation_policy: Option<String>,
    pub status: ContractStatus,
    pub client_accepted_at: DateTime<Utc>,
    pub freelancer_accepted_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit entry. Rows are never updated or deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct OrderEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub event_type: OrderEventType,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// One delivery submission by the freelancer. An order accumulates one of
/// these per submit_delivery call across revision rounds.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Deliverable {
    pub id: Uuid,
    pub order_id: Uuid,
    pub freelancer_id: Uuid,
    pub message: Option<String>,
    pub attachment_urls: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(OrderStatus::PendingAcceptance.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::RevisionRequested));
        assert!(OrderStatus::RevisionRequested.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for next in [
            OrderStatus::PendingAcceptance,
            OrderStatus::InProgress,
            OrderStatus::Delivered,
            OrderStatus::RevisionRequested,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Disputed,
        ] {
            assert!(!OrderStatus::Completed.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_dispute_only_from_in_flight_states() {
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Disputed));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Disputed));
        assert!(OrderStatus::RevisionRequested.can_transition_to(OrderStatus::Disputed));
        assert!(!OrderStatus::PendingAcceptance.can_transition_to(OrderStatus::Disputed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Disputed));
    }

    #[test]
    fn test_disputed_orders_only_resolve_to_terminal() {
        assert!(OrderStatus::Disputed.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Disputed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Disputed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Disputed.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn test_cancellation_from_non_terminal_non_disputed() {
        assert!(OrderStatus::PendingAcceptance.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_contract_mirrors_terminal_order_states() {
        assert_eq!(
            ContractStatus::mirror_of(OrderStatus::Completed),
            Some(ContractStatus::Completed)
        );
        assert_eq!(
            ContractStatus::mirror_of(OrderStatus::Cancelled),
            Some(ContractStatus::Cancelled)
        );
        assert_eq!(ContractStatus::mirror_of(OrderStatus::Delivered), None);
        assert_eq!(ContractStatus::mirror_of(OrderStatus::Disputed), None);
    }
}
