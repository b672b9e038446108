//! Catalogue service implementing [`ProductCatalogue`].

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{ProductCatalogue, ProductRepository};
use super::service_support::map_product_repository_error;
use super::{
    Actor, CatalogueError, CatalogueSummary, Error, Product, ProductDraft, ProductId,
    ProductUpdate, filter_products,
};

/// Product catalogue service.
#[derive(Clone)]
pub struct CatalogueService<P> {
    products: Arc<P>,
}

impl<P> CatalogueService<P> {
    /// Create a new service over the product repository.
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }
}

fn require_reader(actor: &Actor) -> Result<(), CatalogueError> {
    if actor.is_super_admin() {
        Err(CatalogueError::PermissionDenied(actor.to_string()))
    } else {
        Ok(())
    }
}

fn require_admin(actor: &Actor) -> Result<(), CatalogueError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CatalogueError::PermissionDenied(actor.to_string()))
    }
}

impl<P: ProductRepository> CatalogueService<P> {
    async fn all(&self) -> Result<Vec<Product>, Error> {
        self.products
            .list()
            .await
            .map_err(map_product_repository_error)
    }

    async fn load(&self, id: &ProductId) -> Result<Product, Error> {
        self.products
            .find(id)
            .await
            .map_err(map_product_repository_error)?
            .ok_or_else(|| CatalogueError::ProductNotFound(id.clone()).into())
    }

    async fn store(&self, product: &Product) -> Result<(), Error> {
        self.products
            .save(product)
            .await
            .map_err(map_product_repository_error)
    }
}

#[async_trait]
impl<P: ProductRepository> ProductCatalogue for CatalogueService<P> {
    async fn list_products(
        &self,
        actor: &Actor,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Product>, Error> {
        require_reader(actor)?;
        let products = self.all().await?;
        let matching: Vec<Product> = filter_products(&products, search.as_deref().unwrap_or(""))
            .into_iter()
            .cloned()
            .collect();
        Ok(Page::slice(matching, page))
    }

    async fn summary(&self, actor: &Actor) -> Result<CatalogueSummary, Error> {
        require_reader(actor)?;
        Ok(CatalogueSummary::of(&self.all().await?))
    }

    async fn get_product(&self, actor: &Actor, product_id: &ProductId) -> Result<Product, Error> {
        require_reader(actor)?;
        self.load(product_id).await
    }

    async fn create_product(&self, actor: &Actor, draft: ProductDraft) -> Result<Product, Error> {
        require_admin(actor)?;
        let sequence = self
            .products
            .next_product_sequence()
            .await
            .map_err(map_product_repository_error)?;
        let product = Product::new(ProductId::from_sequence(sequence), draft)?;
        self.store(&product).await?;
        info!(product_id = %product.id, "product added");
        Ok(product)
    }

    async fn update_product(
        &self,
        actor: &Actor,
        product_id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product, Error> {
        require_admin(actor)?;
        let mut product = self.load(product_id).await?;
        product.apply(update)?;
        self.store(&product).await?;
        info!(product_id = %product.id, stock = product.stock_quantity, "product updated");
        Ok(product)
    }

    async fn delete_product(&self, actor: &Actor, product_id: &ProductId) -> Result<(), Error> {
        require_admin(actor)?;
        let existed = self
            .products
            .delete(product_id)
            .await
            .map_err(map_product_repository_error)?;
        if !existed {
            return Err(CatalogueError::ProductNotFound(product_id.clone()).into());
        }
        info!(product_id = %product_id, "product removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
