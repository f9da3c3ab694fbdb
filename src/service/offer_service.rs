use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::{
    db::{catalogdb::CatalogExt, db::DBClient, offerdb::OfferExt, orderdb::OrderExt},
    dtos::offerdtos::{CreateOfferDto, RejectOfferDto},
    models::{
        offermodel::{Offer, OfferStatus},
        ordermodel::{Contract, Order},
    },
    service::{
        audit_service::AuditService,
        error::{is_unique_violation, ServiceError},
        notification_service::NotificationService,
    },
    utils::order_number,
};

/// Order numbers live in a 10^4 space per year, so collisions are expected
/// under load. Each attempt reruns the whole acceptance transaction.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct OfferService {
    db_client: Arc<DBClient>,
    audit_service: Arc<AuditService>,
    notification_service: Arc<NotificationService>,
}

impl OfferService {
    pub fn new(
        db_client: Arc<DBClient>,
        audit_service: Arc<AuditService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            audit_service,
            notification_service,
        }
    }

    /// Create an offer against one of the caller's own catalog services.
    /// The listing's title and description are frozen onto the offer so
    /// later catalog edits cannot change outstanding proposals.
    pub async fn create_offer(
        &self,
        freelancer_id: Uuid,
        dto: CreateOfferDto,
    ) -> Result<Offer, ServiceError> {
        let service = self
            .db_client
            .get_service(dto.service_id)
            .await?
            .ok_or(ServiceError::ServiceListingNotFound(dto.service_id))?;

        if service.owner_id != freelancer_id {
            return Err(ServiceError::NotServiceOwner(freelancer_id, dto.service_id));
        }

        let price = effective_price(dto.price, &service.price)?;

        let offer = self
            .db_client
            .create_offer(
                dto.service_id,
                dto.client_id,
                freelancer_id,
                dto.conversation_id,
                price,
                service.currency.clone(),
                dto.delivery_time_days,
                dto.revisions_included,
                dto.scope_of_work,
                dto.cancellation_policy,
                service.title.clone(),
                service.description.clone(),
            )
            .await?;

        if let Err(e) = self.notification_service.notify_offer_created(&offer).await {
            tracing::error!("Failed to send offer.created notification: {:?}", e);
        }

        Ok(offer)
    }

    /// Accept a pending offer, producing the order and its contract in one
    /// atomic unit. Two concurrent accepts on the same offer serialize at
    /// the guarded status flip: exactly one order is ever created.
    pub async fn accept_offer(
        &self,
        offer_id: Uuid,
        client_id: Uuid,
        client_ip_address: Option<String>,
    ) -> Result<OfferAcceptanceResult, ServiceError> {
        let offer = self
            .db_client
            .get_offer_by_id(offer_id)
            .await?
            .ok_or(ServiceError::OfferNotFound(offer_id))?;

        if offer.client_id != client_id {
            return Err(ServiceError::UnauthorizedOfferAccess(client_id, offer_id));
        }

        if offer.order_id.is_some() {
            return Err(ServiceError::OfferAlreadyAccepted(offer_id));
        }

        if offer.status != OfferStatus::Pending {
            return Err(ServiceError::InvalidOfferStatus(offer_id, offer.status));
        }

        let mut attempts = 0;
        let result = loop {
            attempts += 1;
            match self
                .accept_offer_once(&offer, client_id, client_ip_address.clone())
                .await
            {
                Err(ServiceError::Database(e))
                    if is_unique_violation(&e, Some("orders_order_number_key")) =>
                {
                    if attempts >= ORDER_NUMBER_ATTEMPTS {
                        break Err(ServiceError::Conflict(
                            "Could not allocate a unique order number".to_string(),
                        ));
                    }
                    tracing::warn!(
                        "Order number collision accepting offer {}, retrying ({}/{})",
                        offer_id,
                        attempts,
                        ORDER_NUMBER_ATTEMPTS
                    );
                    continue;
                }
                Err(ServiceError::Database(e))
                    if is_unique_violation(&e, Some("orders_offer_id_key")) =>
                {
                    break Err(ServiceError::OfferAlreadyAccepted(offer_id));
                }
                other => break other,
            }
        };
        let result = result?;

        if let Err(e) = self
            .notification_service
            .notify_offer_accepted(&result.offer, &result.order)
            .await
        {
            tracing::error!("Failed to send offer.accepted notification: {:?}", e);
        }

        Ok(result)
    }

    async fn accept_offer_once(
        &self,
        offer: &Offer,
        client_id: Uuid,
        client_ip_address: Option<String>,
    ) -> Result<OfferAcceptanceResult, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        // Serialization point: only one transaction flips pending -> accepted.
        let accepted = self
            .db_client
            .mark_offer_accepted_tx(&mut tx, offer.id)
            .await?;

        if accepted.is_none() {
            drop(tx);
            let current = self
                .db_client
                .get_offer_by_id(offer.id)
                .await?
                .ok_or(ServiceError::OfferNotFound(offer.id))?;

            return Err(if current.order_id.is_some() {
                ServiceError::OfferAlreadyAccepted(offer.id)
            } else {
                ServiceError::InvalidOfferStatus(offer.id, current.status)
            });
        }

        let order_number = order_number::generate();
        let delivery_date = Utc::now() + Duration::days(offer.delivery_time_days as i64);

        // The freelancer committed by making the offer, so the order starts
        // in progress rather than pending acceptance.
        let order = self
            .db_client
            .create_order_tx(&mut tx, offer, &order_number, delivery_date, client_ip_address)
            .await?;

        let linked_offer = self
            .db_client
            .link_offer_to_order_tx(&mut tx, offer.id, order.id)
            .await?;

        let contract = self
            .db_client
            .create_contract_tx(&mut tx, order.id, offer)
            .await?;

        self.audit_service
            .log_order_created_tx(&mut tx, client_id, &order)
            .await?;

        tx.commit().await?;

        Ok(OfferAcceptanceResult {
            offer: linked_offer,
            order,
            contract,
        })
    }

    pub async fn reject_offer(
        &self,
        offer_id: Uuid,
        client_id: Uuid,
        dto: RejectOfferDto,
    ) -> Result<Offer, ServiceError> {
        let offer = self
            .db_client
            .get_offer_by_id(offer_id)
            .await?
            .ok_or(ServiceError::OfferNotFound(offer_id))?;

        if offer.client_id != client_id {
            return Err(ServiceError::UnauthorizedOfferAccess(client_id, offer_id));
        }

        let reason = match dto.reason {
            Some(r) if !r.trim().is_empty() => r,
            _ => "No reason provided".to_string(),
        };

        let rejected = self.db_client.mark_offer_rejected(offer_id, reason).await?;

        let offer = match rejected {
            Some(offer) => offer,
            None => {
                let current = self
                    .db_client
                    .get_offer_by_id(offer_id)
                    .await?
                    .ok_or(ServiceError::OfferNotFound(offer_id))?;

                return Err(if current.order_id.is_some() {
                    ServiceError::OfferAlreadyAccepted(offer_id)
                } else {
                    ServiceError::InvalidOfferStatus(offer_id, current.status)
                });
            }
        };

        if let Err(e) = self.notification_service.notify_offer_rejected(&offer).await {
            tracing::error!("Failed to send offer.rejected notification: {:?}", e);
        }

        Ok(offer)
    }

    pub async fn get_offer(&self, offer_id: Uuid, user_id: Uuid) -> Result<Offer, ServiceError> {
        let offer = self
            .db_client
            .get_offer_by_id(offer_id)
            .await?
            .ok_or(ServiceError::OfferNotFound(offer_id))?;

        if offer.client_id != user_id && offer.freelancer_id != user_id {
            return Err(ServiceError::UnauthorizedOfferAccess(user_id, offer_id));
        }

        Ok(offer)
    }

    pub async fn get_offers_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Offer>, ServiceError> {
        Ok(self
            .db_client
            .get_offers_for_client(client_id, limit, offset)
            .await?)
    }

    pub async fn get_offers_for_freelancer(
        &self,
        freelancer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Offer>, ServiceError> {
        Ok(self
            .db_client
            .get_offers_for_freelancer(freelancer_id, limit, offset)
            .await?)
    }
}

/// Explicit price wins over the catalog price; either way it must be
/// strictly positive.
fn effective_price(
    explicit: Option<f64>,
    catalog_price: &BigDecimal,
) -> Result<BigDecimal, ServiceError> {
    let price = match explicit {
        Some(p) => BigDecimal::try_from(p)
            .map_err(|_| ServiceError::InvalidPrice(format!("{} is not a valid price", p)))?,
        None => catalog_price.clone(),
    };

    if price <= BigDecimal::from(0) {
        return Err(ServiceError::InvalidPrice(
            "Price must be greater than zero".to_string(),
        ));
    }

    Ok(price)
}

#[derive(Debug, Serialize)]
pub struct OfferAcceptanceResult {
    pub offer: Offer,
    pub order: Order,
    pub contract: Contract,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_price_wins_over_catalog() {
        let catalog = BigDecimal::from(250);
        let price = effective_price(Some(100.0), &catalog).unwrap();
        assert_eq!(price, BigDecimal::try_from(100.0).unwrap());
    }

    #[test]
    fn test_catalog_price_used_when_no_explicit_price() {
        let catalog = BigDecimal::from(250);
        let price = effective_price(None, &catalog).unwrap();
        assert_eq!(price, catalog);
    }

    #[test]
    fn test_zero_and_negative_prices_rejected() {
        let catalog = BigDecimal::from(0);
        assert!(matches!(
            effective_price(None, &catalog),
            Err(ServiceError::InvalidPrice(_))
        ));
        assert!(matches!(
            effective_price(Some(-5.0), &BigDecimal::from(100)),
            Err(ServiceError::InvalidPrice(_))
        ));
        assert!(matches!(
            effective_price(Some(0.0), &BigDecimal::from(100)),
            Err(ServiceError::InvalidPrice(_))
        ));
    }
}
