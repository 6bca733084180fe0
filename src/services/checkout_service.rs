use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{
        customer::{Customer, CustomerError},
        product::Shippable,
        receipt::{Quote, Receipt, ShipmentItem, ShipmentNotice},
    },
    repositories::{ProductRepository, ProductRepositoryError},
    services::cart_service::{resolve_lines, ResolvedLine},
};

/// Shipping charged per unit of weight.
pub const DEFAULT_SHIPPING_RATE: u32 = 30;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient balance. Total: ${total}, Your balance: ${balance}")]
    InsufficientBalance { total: Decimal, balance: Decimal },

    #[error("Amount too large to charge")]
    AmountOverflow,

    #[error("Customer error: {0}")]
    CustomerError(#[from] CustomerError),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] ProductRepositoryError),
}

/// Collect every shippable parcel into a notice with its combined weight.
pub fn shipment_notice<S: Shippable>(
    parcels: impl IntoIterator<Item = (S, u32)>,
) -> Result<ShipmentNotice, CheckoutError> {
    let items = parcels
        .into_iter()
        .map(|(parcel, quantity)| {
            Ok(ShipmentItem {
                name: parcel.name().to_string(),
                quantity,
                weight: parcel
                    .weight()
                    .checked_mul(Decimal::from(quantity))
                    .ok_or(CheckoutError::AmountOverflow)?,
            })
        })
        .collect::<Result<Vec<_>, CheckoutError>>()?;
    let total_weight = checked_sum(items.iter().map(|item| Some(item.weight)))?;

    Ok(ShipmentNotice { items, total_weight })
}

fn checked_sum(amounts: impl IntoIterator<Item = Option<Decimal>>) -> Result<Decimal, CheckoutError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| amount.and_then(|a| acc.checked_add(a)))
        .ok_or(CheckoutError::AmountOverflow)
}

pub struct CheckoutService {
    product_repository: Arc<dyn ProductRepository>,
    shipping_rate: Decimal,
}

impl CheckoutService {
    pub fn new(product_repository: Arc<dyn ProductRepository>, shipping_rate: Decimal) -> Self {
        Self {
            product_repository,
            shipping_rate,
        }
    }

    pub fn shipping_rate(&self) -> Decimal {
        self.shipping_rate
    }

    /// Subtotal, shipping and total for resolved lines. Pure.
    pub fn quote(&self, lines: &[ResolvedLine]) -> Result<(Quote, ShipmentNotice), CheckoutError> {
        let subtotal = checked_sum(
            lines
                .iter()
                .map(|line| line.product.line_total(line.quantity)),
        )?;

        let shipment = shipment_notice(
            lines
                .iter()
                .filter_map(|line| line.product.as_shippable().map(|s| (s, line.quantity))),
        )?;
        let shipping = shipment
            .total_weight
            .checked_mul(self.shipping_rate)
            .ok_or(CheckoutError::AmountOverflow)?;

        let quote = Quote {
            subtotal,
            shipping,
            total: subtotal
                .checked_add(shipping)
                .ok_or(CheckoutError::AmountOverflow)?,
        };
        Ok((quote, shipment))
    }

    /// Charge the customer for everything in the cart and clear it.
    /// Balance, cart and stock are untouched on error.
    pub fn checkout(&self, customer: &mut Customer) -> Result<Receipt, CheckoutError> {
        if customer.cart.is_empty() {
            warn!("Checkout attempted with an empty cart by '{}'", customer.name);
            return Err(CheckoutError::EmptyCart);
        }

        let lines = resolve_lines(self.product_repository.as_ref(), &customer.cart)?;
        let (quote, shipment) = self.quote(&lines)?;

        if !customer.can_afford(quote.total) {
            warn!(
                "Insufficient balance for '{}': total {}, balance {}",
                customer.name,
                quote.total,
                customer.balance()
            );
            return Err(CheckoutError::InsufficientBalance {
                total: quote.total,
                balance: customer.balance(),
            });
        }

        let remaining_balance = customer.debit(quote.total)?;
        customer.cart.clear();

        info!(
            "Checkout for '{}': subtotal {}, shipping {}, total {}, remaining {}",
            customer.name, quote.subtotal, quote.shipping, quote.total, remaining_balance
        );

        Ok(Receipt {
            customer: customer.name.clone(),
            items: lines.iter().map(ResolvedLine::to_item).collect(),
            quote,
            shipment,
            remaining_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{CartLine, StoreCustomerRequest};
    use crate::models::product::Product;
    use crate::repositories::InMemoryProductRepository;
    use chrono::Utc;

    struct Parcel(&'static str, Decimal);

    impl Shippable for Parcel {
        fn name(&self) -> &str {
            self.0
        }

        fn weight(&self) -> Decimal {
            self.1
        }
    }

    fn setup(balance: i64) -> (Arc<InMemoryProductRepository>, CheckoutService, Customer) {
        let repo = Arc::new(InMemoryProductRepository::new(Product::seed_catalog(Utc::now()).unwrap()).unwrap());
        let service = CheckoutService::new(repo.clone(), Decimal::from(DEFAULT_SHIPPING_RATE));
        let customer = Customer::new(
            StoreCustomerRequest::new("Ada".to_string(), Decimal::from(balance)).unwrap(),
        )
        .unwrap();
        (repo, service, customer)
    }

    fn resolved(repo: &InMemoryProductRepository, lines: &[(u32, u32)]) -> Vec<ResolvedLine> {
        lines
            .iter()
            .map(|&(id, quantity)| ResolvedLine {
                product: repo.find_by_id(id).unwrap().unwrap(),
                quantity,
            })
            .collect()
    }

    #[test]
    fn test_shipment_notice_sums_weights() {
        let notice = shipment_notice(vec![
            (Parcel("Box", Decimal::new(15, 1)), 2),
            (Parcel("Bag", Decimal::new(25, 2)), 4),
        ])
        .unwrap();
        assert_eq!(notice.items.len(), 2);
        assert_eq!(notice.items[0].weight, Decimal::from(3));
        assert_eq!(notice.total_weight, Decimal::from(4));
    }

    #[test]
    fn test_quote_ignores_unshippable_weight() {
        let (repo, service, _) = setup(0);

        let (quote, shipment) = service.quote(&resolved(&repo, &[(4, 3)])).unwrap();
        assert_eq!(quote.subtotal, Decimal::from(60));
        assert_eq!(quote.shipping, Decimal::ZERO);
        assert_eq!(quote.total, Decimal::from(60));
        assert!(shipment.is_empty());
    }

    #[test]
    fn test_quote_is_order_independent() {
        let (repo, service, _) = setup(0);

        let (a, _) = service.quote(&resolved(&repo, &[(1, 2), (2, 1), (3, 1), (4, 4)])).unwrap();
        let (b, _) = service.quote(&resolved(&repo, &[(4, 4), (3, 1), (2, 1), (1, 2)])).unwrap();
        assert_eq!(a, b);
        // 20 + 8 + 300 + 80
        assert_eq!(a.subtotal, Decimal::from(408));
        // (1.0 + 1.0 + 5.0) * 30
        assert_eq!(a.shipping, Decimal::from(210));
    }

    #[test]
    fn test_checkout_empty_cart() {
        let (_, service, mut customer) = setup(500);

        let result = service.checkout(&mut customer);
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(customer.balance(), Decimal::from(500));
    }

    #[test]
    fn test_checkout_insufficient_balance() {
        let (_, service, mut customer) = setup(100);
        customer.cart.add_line(CartLine { product_id: 3, quantity: 1 });

        match service.checkout(&mut customer) {
            Err(CheckoutError::InsufficientBalance { total, balance }) => {
                assert_eq!(total, Decimal::from(450));
                assert_eq!(balance, Decimal::from(100));
            }
            other => panic!("expected insufficient balance, got {:?}", other),
        }
        assert_eq!(customer.balance(), Decimal::from(100));
        assert_eq!(customer.cart.len(), 1);
    }

    #[test]
    fn test_checkout_exact_balance_succeeds() {
        let (_, service, mut customer) = setup(450);
        customer.cart.add_line(CartLine { product_id: 3, quantity: 1 });

        let receipt = service.checkout(&mut customer).unwrap();
        assert_eq!(receipt.quote.total, Decimal::from(450));
        assert_eq!(receipt.remaining_balance, Decimal::ZERO);
        assert!(customer.cart.is_empty());
    }

    #[test]
    fn test_checkout_receipt() {
        let (_, service, mut customer) = setup(500);
        customer.cart.add_line(CartLine { product_id: 1, quantity: 2 });
        customer.cart.add_line(CartLine { product_id: 4, quantity: 1 });

        let receipt = service.checkout(&mut customer).unwrap();
        assert_eq!(receipt.customer, "Ada");
        assert_eq!(receipt.quote.subtotal, Decimal::from(40));
        assert_eq!(receipt.quote.shipping, Decimal::from(30));
        assert_eq!(receipt.quote.total, Decimal::from(70));
        assert_eq!(receipt.remaining_balance, Decimal::from(430));
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.shipment.items.len(), 1);
        assert_eq!(receipt.shipment.items[0].name, "Cheese");
        assert_eq!(receipt.shipment.total_weight, Decimal::ONE);

        assert!(matches!(
            service.checkout(&mut customer),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_custom_shipping_rate() {
        let (repo, _, _) = setup(0);
        let service = CheckoutService::new(repo.clone(), Decimal::new(125, 1));

        let (quote, _) = service.quote(&resolved(&repo, &[(2, 2)])).unwrap();
        assert_eq!(quote.shipping, Decimal::from(25));
        assert_eq!(service.shipping_rate(), Decimal::new(125, 1));
    }

    #[test]
    fn test_huge_shipping_rate_fails_without_charging() {
        let (repo, _, mut customer) = setup(500);
        let service = CheckoutService::new(repo.clone(), Decimal::MAX);
        customer.cart.add_line(CartLine { product_id: 3, quantity: 1 });

        let result = service.checkout(&mut customer);
        assert!(matches!(result, Err(CheckoutError::AmountOverflow)));
        assert_eq!(customer.balance(), Decimal::from(500));
        assert_eq!(customer.cart.len(), 1);
        assert_eq!(repo.find_by_id(3).unwrap().unwrap().stock, 2);
    }
}
