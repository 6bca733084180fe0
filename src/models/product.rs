use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub type ProductId = u32;

/// Capability of an item that can be packed into a shipment.
pub trait Shippable {
    fn name(&self) -> &str;
    fn weight(&self) -> Decimal;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    /// Only expirable products carry an expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Only shippable products carry a weight.
    pub weight: Option<Decimal>,
}

/// Borrowed view of a product that ships, handed out by [`Product::as_shippable`].
#[derive(Debug, Clone, Copy)]
pub struct ShippableProduct<'a> {
    product: &'a Product,
    weight: Decimal,
}

impl Shippable for ShippableProduct<'_> {
    fn name(&self) -> &str {
        &self.product.name
    }

    fn weight(&self) -> Decimal {
        self.weight
    }
}

// request dto
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct StoreProductRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[validate(custom = "validate_name")]
    pub name: String,

    #[validate(custom = "validate_price")]
    pub price: Decimal,

    pub stock: u32,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(custom = "validate_weight")]
    pub weight: Option<Decimal>,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("Name is required"));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("price_negative"));
    }
    Ok(())
}

fn validate_weight(weight: &Decimal) -> Result<(), ValidationError> {
    if *weight <= Decimal::ZERO {
        return Err(ValidationError::new("weight_not_positive"));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Product {
    pub fn new(id: ProductId, request: StoreProductRequest) -> Result<Self, ProductError> {
        request.validate()?;

        Ok(Self {
            id,
            name: request.name.trim().to_string(),
            price: request.price,
            stock: request.stock,
            expires_at: request.expires_at,
            weight: request.weight,
        })
    }

    /// A product is expired only if it is expirable and `now` is past its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }

    pub fn as_shippable(&self) -> Option<ShippableProduct<'_>> {
        self.weight.map(|weight| ShippableProduct {
            product: self,
            weight,
        })
    }

    pub fn is_shippable(&self) -> bool {
        self.weight.is_some()
    }

    /// `None` if the amount does not fit in a `Decimal`.
    pub fn line_total(&self, quantity: u32) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(quantity))
    }

    /// The fixed catalog every session starts with. Expiries are relative to `now`.
    pub fn seed_catalog(now: DateTime<Utc>) -> Result<Vec<Product>, ProductError> {
        let seeds = [
            ("Cheese", Decimal::from(10), 5, Some(now + Duration::days(3)), Some(Decimal::new(5, 1))),
            ("Milk", Decimal::from(8), 10, Some(now + Duration::days(2)), Some(Decimal::ONE)),
            ("TV", Decimal::from(300), 2, None, Some(Decimal::from(5))),
            ("Scratch Card", Decimal::from(20), 5, None, None),
        ];

        seeds
            .into_iter()
            .zip(1..)
            .map(|((name, price, stock, expires_at, weight), id)| {
                Product::new(
                    id,
                    StoreProductRequest {
                        name: name.to_string(),
                        price,
                        stock,
                        expires_at,
                        weight,
                    },
                )
            })
            .collect()
    }
}
