//! Invoice rendering for approved reorder requests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Plain-text invoice view of a reorder request.
///
/// Rendering rules: the quantity drops a zero fractional part ("3", not
/// "3.00"), a missing price shows as "N/A", and a missing total defaults
/// to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceView {
    pub sku_name: String,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub total_amount: Decimal,
}

impl InvoiceView {
    pub fn render(&self) -> String {
        let qty = format_quantity(self.quantity);
        let price = self
            .unit_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "Invoice\nItem: {}\nQty: {}\nUnit price: {}\nTotal: {}",
            self.sku_name, qty, price, self.total_amount
        )
    }
}

fn format_quantity(qty: Decimal) -> String {
    if qty.is_integer() {
        qty.normalize().to_string()
    } else {
        qty.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_quantity_renders_without_fraction() {
        let invoice = InvoiceView {
            sku_name: "Milk".to_string(),
            quantity: Decimal::new(300, 2), // 3.00
            unit_price: Some(Decimal::from(50)),
            total_amount: Decimal::from(150),
        };

        let text = invoice.render();
        assert!(text.contains("Qty: 3\n"), "{text}");
        assert!(text.contains("Total: 150"));
    }

    #[test]
    fn fractional_quantity_renders_as_given() {
        let invoice = InvoiceView {
            sku_name: "Rice".to_string(),
            quantity: Decimal::new(25, 1), // 2.5
            unit_price: None,
            total_amount: Decimal::ZERO,
        };

        let text = invoice.render();
        assert!(text.contains("Qty: 2.5\n"), "{text}");
        assert!(text.contains("Unit price: N/A"));
        assert!(text.contains("Total: 0"));
    }
}
