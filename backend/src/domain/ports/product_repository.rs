//! Driven port for the product catalogue.

use async_trait::async_trait;

use crate::domain::{Product, ProductId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "product repository query failed: {message}",
    }
}

/// Storage for products, listed in insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Reserve the next number for a generated `PRODUCT-NNN` identifier.
    async fn next_product_sequence(&self) -> Result<u64, ProductRepositoryError>;

    /// All products.
    async fn list(&self) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Fetch a product.
    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Insert or replace a product.
    async fn save(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    /// Remove a product, reporting whether it existed.
    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError>;
}
