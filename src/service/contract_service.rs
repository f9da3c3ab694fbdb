use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, orderdb::OrderExt},
    models::ordermodel::Contract,
    service::error::ServiceError,
};

/// Read surface for frozen contract terms. Contracts are written by offer
/// acceptance and their status is mirrored by order transitions; nothing
/// here recomputes terms from the order.
#[derive(Debug, Clone)]
pub struct ContractService {
    db_client: Arc<DBClient>,
}

impl ContractService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn get_by_order_id(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Contract, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if !order.is_participant(user_id) {
            return Err(ServiceError::UnauthorizedOrderAccess(user_id, order_id));
        }

        self.db_client
            .get_contract_by_order_id(order_id)
            .await?
            .ok_or(ServiceError::ContractNotFound(order_id))
    }
}
