//! Line items shared by quotes and invoices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One priced line of a quote or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentLine {
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub sort_order: i32,
}

impl DocumentLine {
    pub fn new(description: impl Into<String>, unit_price: Decimal, quantity: Decimal) -> Self {
        Self {
            description: description.into(),
            unit_price,
            quantity,
            sort_order: 0,
        }
    }

    pub fn total(&self) -> Decimal {
        self.unit_price * self.quantity
    }
}

/// Sum of `unit_price * quantity` over all lines.
pub fn document_total(lines: &[DocumentLine]) -> Decimal {
    lines.iter().map(DocumentLine::total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_line_products() {
        let lines = vec![
            DocumentLine::new("Design", Decimal::new(45000, 2), Decimal::from(2)),
            DocumentLine::new("Hosting", Decimal::new(1999, 2), Decimal::new(15, 1)),
        ];
        // 450.00 * 2 + 19.99 * 1.5
        assert_eq!(document_total(&lines), Decimal::new(929985, 3));
    }

    #[test]
    fn empty_document_totals_zero() {
        assert_eq!(document_total(&[]), Decimal::ZERO);
    }
}
