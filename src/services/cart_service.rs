use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    models::{
        customer::{Cart, CartLine, Customer},
        product::{Product, ProductId},
        receipt::{CartItem, CartSummary},
    },
    repositories::{ProductRepository, ProductRepositoryError},
};

#[derive(Error, Debug)]
pub enum CartServiceError {
    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("Cannot add expired product '{name}'")]
    ExpiredProduct { name: String },

    #[error("Repository error: {0}")]
    RepositoryError(#[from] ProductRepositoryError),
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub product: Product,
    pub quantity: u32,
}

impl ResolvedLine {
    pub fn to_item(&self) -> CartItem {
        CartItem {
            product_id: self.product.id,
            name: self.product.name.clone(),
            unit_price: self.product.price,
            quantity: self.quantity,
            shippable: self.product.is_shippable(),
        }
    }
}

/// Join every cart line with its product, keeping cart order.
pub fn resolve_lines(
    repository: &dyn ProductRepository,
    cart: &Cart,
) -> Result<Vec<ResolvedLine>, ProductRepositoryError> {
    cart.lines()
        .iter()
        .map(|line| {
            let product = repository
                .find_by_id(line.product_id)?
                .ok_or(ProductRepositoryError::NotFound(line.product_id))?;
            Ok(ResolvedLine {
                product,
                quantity: line.quantity,
            })
        })
        .collect()
}

pub struct CartService {
    product_repository: Arc<dyn ProductRepository>,
}

impl CartService {
    pub fn new(product_repository: Arc<dyn ProductRepository>) -> Self {
        Self { product_repository }
    }

    /// Current catalog with live stock counts
    pub fn catalog(&self) -> Result<Vec<Product>, CartServiceError> {
        Ok(self.product_repository.find_all()?)
    }

    /// Look up a product the customer may add right now.
    pub fn available_product(&self, product_id: ProductId) -> Result<Product, CartServiceError> {
        self.available_product_at(product_id, Utc::now())
    }

    pub fn available_product_at(
        &self,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> Result<Product, CartServiceError> {
        let product = self
            .product_repository
            .find_by_id(product_id)?
            .ok_or_else(|| CartServiceError::InvalidSelection {
                reason: format!("no product with id {}", product_id),
            })?;

        if product.is_expired_at(now) {
            warn!("Rejected expired product '{}'", product.name);
            return Err(CartServiceError::ExpiredProduct { name: product.name });
        }

        Ok(product)
    }

    pub fn add_to_cart(
        &self,
        customer: &mut Customer,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, CartServiceError> {
        self.add_to_cart_at(customer, product_id, quantity, Utc::now())
    }

    /// Add `quantity` units to the customer's cart, taking them out of stock.
    /// Nothing changes on error.
    pub fn add_to_cart_at(
        &self,
        customer: &mut Customer,
        product_id: ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<CartItem, CartServiceError> {
        info!(
            "Adding {} x product {} to cart of '{}'",
            quantity, product_id, customer.name
        );

        // Expiry is checked before quantity
        let product = self.available_product_at(product_id, now)?;

        if quantity == 0 {
            return Err(CartServiceError::InvalidSelection {
                reason: "quantity must be at least 1".to_string(),
            });
        }

        let product = self
            .product_repository
            .reserve_stock(product.id, quantity)
            .map_err(|e| match e {
                ProductRepositoryError::InsufficientStock {
                    name,
                    requested,
                    available,
                } => CartServiceError::InvalidSelection {
                    reason: format!(
                        "only {} of '{}' in stock, {} requested",
                        available, name, requested
                    ),
                },
                other => CartServiceError::RepositoryError(other),
            })?;

        customer.cart.add_line(CartLine {
            product_id: product.id,
            quantity,
        });

        debug!("'{}' now has {} cart lines", customer.name, customer.cart.len());
        Ok(ResolvedLine { product, quantity }.to_item())
    }

    pub fn view_cart(&self, customer: &Customer) -> Result<CartSummary, CartServiceError> {
        let items: Vec<CartItem> = resolve_lines(self.product_repository.as_ref(), &customer.cart)?
            .iter()
            .map(ResolvedLine::to_item)
            .collect();
        let subtotal = items.iter().map(CartItem::line_total).sum::<Decimal>();

        Ok(CartSummary { items, subtotal })
    }
}
