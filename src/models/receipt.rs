use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::product::ProductId;

/// A cart line joined with its catalog product, ready for display or pricing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub shippable: bool,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
}

impl CartSummary {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentItem {
    pub name: String,
    pub quantity: u32,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShipmentNotice {
    pub items: Vec<ShipmentItem>,
    pub total_weight: Decimal,
}

impl ShipmentNotice {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    pub customer: String,
    pub items: Vec<CartItem>,
    pub quote: Quote,
    pub shipment: ShipmentNotice,
    pub remaining_balance: Decimal,
}
