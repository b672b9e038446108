//! In-memory product catalogue.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::upsert;

use crate::domain::ports::{ProductRepository, ProductRepositoryError};
use crate::domain::{Product, ProductId};

#[derive(Debug, Default)]
struct ProductStore {
    sequence: u64,
    products: Vec<Product>,
}

/// Products behind a read/write lock, kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    store: RwLock<ProductStore>,
}

impl InMemoryProductRepository {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ProductStore>, ProductRepositoryError> {
        self.store
            .read()
            .map_err(|_| ProductRepositoryError::query("catalogue lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ProductStore>, ProductRepositoryError> {
        self.store
            .write()
            .map_err(|_| ProductRepositoryError::query("catalogue lock poisoned"))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn next_product_sequence(&self) -> Result<u64, ProductRepositoryError> {
        let mut store = self.write()?;
        store.sequence += 1;
        Ok(store.sequence)
    }

    async fn list(&self) -> Result<Vec<Product>, ProductRepositoryError> {
        Ok(self.read()?.products.clone())
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(self
            .read()?
            .products
            .iter()
            .find(|product| &product.id == id)
            .cloned())
    }

    async fn save(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        upsert(&mut self.write()?.products, product, |p| &p.id);
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError> {
        let mut store = self.write()?;
        let before = store.products.len();
        store.products.retain(|product| &product.id != id);
        Ok(store.products.len() != before)
    }
}
