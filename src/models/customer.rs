use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::product::ProductId;

/// One pending purchase. Refers to the catalog product by id; the catalog owns the product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    balance: Decimal,
    pub cart: Cart,
}

#[derive(Debug, Validate, Deserialize)]
pub struct StoreCustomerRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    #[validate(custom = "validate_name")]
    pub name: String,

    #[validate(custom = "validate_balance")]
    pub balance: Decimal,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("Name is required"));
    }
    Ok(())
}

fn validate_balance(balance: &Decimal) -> Result<(), ValidationError> {
    if balance.is_sign_negative() && !balance.is_zero() {
        return Err(ValidationError::new("balance_negative"));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Cannot debit {amount}: balance is only {balance}")]
    Overdraft { amount: Decimal, balance: Decimal },
}

impl StoreCustomerRequest {
    pub fn new(name: String, balance: Decimal) -> Result<Self, CustomerError> {
        let request = Self {
            name: name.trim().to_string(),
            balance,
        };
        request.validate()?;
        Ok(request)
    }
}

impl Customer {
    pub fn new(request: StoreCustomerRequest) -> Result<Self, CustomerError> {
        request.validate()?;

        Ok(Self {
            name: request.name,
            balance: request.balance,
            cart: Cart::new(),
        })
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Balance never goes below zero.
    pub fn debit(&mut self, amount: Decimal) -> Result<Decimal, CustomerError> {
        if !self.can_afford(amount) {
            return Err(CustomerError::Overdraft {
                amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }
}
