use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dukaan_core::{LostSaleId, SkuId, StoreId};

/// Stock level for one SKU (1:1 with the catalog item).
///
/// The level is a signed decimal: negative stock represents backorder and is
/// deliberately not clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub sku_id: SkuId,
    pub stock_level: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(sku_id: SkuId, stock_level: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            sku_id,
            stock_level,
            last_updated: at,
        }
    }

    /// Apply a signed delta: positive for a stock update, negative for a sale.
    pub fn apply_delta(&self, delta: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            sku_id: self.sku_id,
            stock_level: self.stock_level + delta,
            last_updated: at,
        }
    }
}

/// A demand signal the store could not serve: a customer asked for an item
/// that was out of stock or not in the catalog at all.
///
/// Append-only; never mutated. Feeds demand scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostSale {
    pub id: LostSaleId,
    pub store_id: StoreId,
    /// Resolved catalog item, when resolution succeeded.
    pub sku_id: Option<SkuId>,
    /// Raw item name as spoken/typed; retained even when resolved.
    pub sku_name: String,
    pub requested_qty: Decimal,
    pub detected_at: DateTime<Utc>,
}

impl LostSale {
    pub fn unresolved(
        store_id: StoreId,
        sku_name: impl Into<String>,
        requested_qty: Decimal,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LostSaleId::new(),
            store_id,
            sku_id: None,
            sku_name: sku_name.into(),
            requested_qty,
            detected_at,
        }
    }

    pub fn resolved(
        store_id: StoreId,
        sku_id: SkuId,
        sku_name: impl Into<String>,
        requested_qty: Decimal,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LostSaleId::new(),
            store_id,
            sku_id: Some(sku_id),
            sku_name: sku_name.into(),
            requested_qty,
            detected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_moves_stock_and_timestamp() {
        let t0 = Utc::now();
        let rec = InventoryRecord::new(SkuId::new(), Decimal::from(10), t0);

        let t1 = t0 + chrono::Duration::seconds(5);
        let updated = rec.apply_delta(Decimal::from(-4), t1);

        assert_eq!(updated.stock_level, Decimal::from(6));
        assert_eq!(updated.last_updated, t1);
        // Original untouched.
        assert_eq!(rec.stock_level, Decimal::from(10));
    }

    #[test]
    fn stock_may_go_negative_for_backorder() {
        let rec = InventoryRecord::new(SkuId::new(), Decimal::from(2), Utc::now());
        let updated = rec.apply_delta(Decimal::from(-5), Utc::now());
        assert_eq!(updated.stock_level, Decimal::from(-3));
    }
}
