use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::models::product::{Product, ProductId};

#[derive(Error, Debug)]
pub enum ProductRepositoryError {
    #[error("Product {0} not found")]
    NotFound(ProductId),
    #[error("Only {available} of '{name}' in stock, {requested} requested")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },
    #[error("Duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("Catalog lock poisoned")]
    LockPoisoned,
}

/// Product repository trait for catalog access
pub trait ProductRepository: Send + Sync {
    /// All products in catalog order.
    fn find_all(&self) -> Result<Vec<Product>, ProductRepositoryError>;
    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError>;
    /// Takes `quantity` units out of stock and returns the product as it is afterwards.
    /// Leaves stock untouched on error.
    fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<Product, ProductRepositoryError>;
}

/// In-memory implementation of ProductRepository
#[derive(Debug)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new(products: Vec<Product>) -> Result<Self, ProductRepositoryError> {
        for (i, product) in products.iter().enumerate() {
            if products[..i].iter().any(|p| p.id == product.id) {
                return Err(ProductRepositoryError::DuplicateId(product.id));
            }
        }

        tracing::debug!("Catalog loaded with {} products", products.len());
        Ok(Self {
            products: RwLock::new(products),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Product>>, ProductRepositoryError> {
        self.products
            .read()
            .map_err(|_| ProductRepositoryError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Product>>, ProductRepositoryError> {
        self.products
            .write()
            .map_err(|_| ProductRepositoryError::LockPoisoned)
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_all(&self) -> Result<Vec<Product>, ProductRepositoryError> {
        Ok(self.read()?.clone())
    }

    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(self.read()?.iter().find(|p| p.id == id).cloned())
    }

    fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<Product, ProductRepositoryError> {
        let mut products = self.write()?;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ProductRepositoryError::NotFound(id))?;

        if quantity > product.stock {
            return Err(ProductRepositoryError::InsufficientStock {
                name: product.name.clone(),
                requested: quantity,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        tracing::debug!(
            "Reserved {} x '{}', {} left in stock",
            quantity,
            product.name,
            product.stock
        );
        Ok(product.clone())
    }
}
