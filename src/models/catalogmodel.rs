use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

/// Read-only projection of a catalog service listing. The engine never
/// writes this table; offers snapshot title/description/price at creation
/// so later catalog edits do not leak into outstanding offers.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ServiceListing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
