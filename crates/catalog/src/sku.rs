use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dukaan_core::{SkuId, StoreId};

/// A catalog item. Immutable once created; resolved by name lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    pub store_id: StoreId,
    pub name: String,
    /// Category used to pick the supplier for reorder negotiations.
    pub category: String,
    pub created_at: DateTime<Utc>,
}
