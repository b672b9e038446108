//! Driving port for the product catalogue.
//!
//! Admins and technicians read the catalogue; only admins change it.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Actor, CatalogueSummary, Error, Product, ProductDraft, ProductId, ProductUpdate,
};

/// Product reads and edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalogue: Send + Sync {
    /// Search and page products by name, brand or description.
    async fn list_products(
        &self,
        actor: &Actor,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Product>, Error>;

    /// Totals across every product.
    async fn summary(&self, actor: &Actor) -> Result<CatalogueSummary, Error>;

    /// Fetch one product.
    async fn get_product(&self, actor: &Actor, product_id: &ProductId) -> Result<Product, Error>;

    /// Add a product.
    async fn create_product(&self, actor: &Actor, draft: ProductDraft) -> Result<Product, Error>;

    /// Change a product's details or stock.
    async fn update_product(
        &self,
        actor: &Actor,
        product_id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product, Error>;

    /// Remove a product.
    async fn delete_product(&self, actor: &Actor, product_id: &ProductId) -> Result<(), Error>;
}
