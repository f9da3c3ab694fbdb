use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::HttpError,
    models::{
        disputemodel::DisputeStatus, offermodel::OfferStatus, ordermodel::OrderStatus,
    },
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("Contract for order {0} not found")]
    ContractNotFound(Uuid),

    #[error("Dispute {0} not found")]
    DisputeNotFound(Uuid),

    #[error("Service listing {0} not found")]
    ServiceListingNotFound(Uuid),

    #[error("User {0} does not own service {1}")]
    NotServiceOwner(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on offer {1}")]
    UnauthorizedOfferAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on order {1}")]
    UnauthorizedOrderAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on dispute {1}")]
    UnauthorizedDisputeAccess(Uuid, Uuid),

    #[error("Offer {0} is not in status {1:?}")]
    InvalidOfferStatus(Uuid, OfferStatus),

    #[error("Order {0} does not permit this operation in status {1:?}")]
    InvalidOrderStatus(Uuid, OrderStatus),

    #[error("Dispute {0} is not in status {1:?}")]
    InvalidDisputeStatus(Uuid, DisputeStatus),

    #[error("Offer {0} has already been accepted")]
    OfferAlreadyAccepted(Uuid),

    #[error("Order {0} already has an active dispute")]
    DisputeAlreadyOpen(Uuid),

    #[error("You have already reviewed this order")]
    AlreadyReviewed(Uuid),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Revision limit exceeded: {used} of {included} revisions used")]
    RevisionLimitExceeded { used: i32, included: i32 },

    #[error("A resolution note is required to resolve or close a dispute")]
    ResolutionRequired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::OfferNotFound(_)
            | ServiceError::OrderNotFound(_)
            | ServiceError::ContractNotFound(_)
            | ServiceError::DisputeNotFound(_)
            | ServiceError::ServiceListingNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::NotServiceOwner(_, _)
            | ServiceError::UnauthorizedOfferAccess(_, _)
            | ServiceError::UnauthorizedOrderAccess(_, _)
            | ServiceError::UnauthorizedDisputeAccess(_, _) => StatusCode::UNAUTHORIZED,

            ServiceError::InvalidOfferStatus(_, _)
            | ServiceError::InvalidOrderStatus(_, _)
            | ServiceError::InvalidDisputeStatus(_, _)
            | ServiceError::InvalidPrice(_)
            | ServiceError::RevisionLimitExceeded { .. }
            | ServiceError::ResolutionRequired
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            // Double-submit guards: the operation already happened, the
            // caller should re-fetch rather than treat this as a failure
            // that needs fixing.
            ServiceError::OfferAlreadyAccepted(_)
            | ServiceError::DisputeAlreadyOpen(_)
            | ServiceError::AlreadyReviewed(_)
            | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}

/// True when the sqlx error is a Postgres unique violation (SQLSTATE 23505)
/// on the named constraint, or on any constraint when `constraint` is None.
pub fn is_unique_violation(error: &sqlx::Error, constraint: Option<&str>) -> bool {
    match error.as_database_error() {
        Some(db_err) if db_err.code().as_deref() == Some("23505") => match constraint {
            Some(name) => db_err.constraint() == Some(name),
            None => true,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::OrderNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::OfferNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_double_submit_guards_map_to_409() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::OfferAlreadyAccepted(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DisputeAlreadyOpen(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::AlreadyReviewed(id).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_business_rule_violations_map_to_400() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::RevisionLimitExceeded {
                used: 1,
                included: 1
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidOrderStatus(id, OrderStatus::Disputed).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::ResolutionRequired.status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
