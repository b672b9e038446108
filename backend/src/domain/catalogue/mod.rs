//! Product catalogue: the parts and equipment a company stocks for its jobs.
//!
//! Stock figures are informational. Nothing here reserves stock when a job
//! card marks an item used.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::failure::{DomainFailure, FailureKind};
use super::identifier::string_identifier;

string_identifier!(
    /// Product identifier.
    ProductId, prefix = "PRODUCT"
);

/// Failures raised by catalogue rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    /// No product has the identifier.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    /// A supplied value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// The actor may not use the catalogue this way.
    #[error("{0} may not manage the product catalogue")]
    PermissionDenied(String),
}

impl CatalogueError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl DomainFailure for CatalogueError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::ProductNotFound(_) => FailureKind::NotFound,
            Self::InvalidInput { .. } => FailureKind::InvalidInput,
            Self::PermissionDenied(_) => FailureKind::PermissionDenied,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::ProductNotFound(_) => "product_not_found",
            Self::InvalidInput { .. } => "invalid_input",
            Self::PermissionDenied(_) => "permission_denied",
        }
    }

    fn detail_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        if let Self::InvalidInput { field, .. } = self {
            fields.insert("field".to_owned(), json!(field));
        }
        fields
    }
}

impl From<CatalogueError> for super::Error {
    fn from(value: CatalogueError) -> Self {
        super::failure::to_api_error(&value)
    }
}

/// A stocked product.
///
/// # Examples
/// ```
/// use fieldcrew::domain::{Product, ProductDraft, ProductId};
///
/// let camera = Product::new(
///     ProductId::new("PRODUCT-001"),
///     ProductDraft {
///         name: "Hikvision Security Camera".to_owned(),
///         brand: "Hikvision".to_owned(),
///         price_cents: 29_999,
///         stock_quantity: 45,
///         description: "IP camera with night vision".to_owned(),
///         image: None,
///     },
/// )
/// .expect("valid product");
/// assert_eq!(camera.stock_value_cents(), 1_349_955);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Manufacturer or brand.
    pub brand: String,
    /// Unit price in cents.
    pub price_cents: u64,
    /// Units in stock.
    pub stock_quantity: u32,
    /// Free-text description.
    pub description: String,
    /// Picture URL.
    pub image: Option<String>,
}

/// Unvalidated input for a new product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Manufacturer or brand.
    pub brand: String,
    /// Unit price in cents.
    pub price_cents: u64,
    /// Units in stock.
    pub stock_quantity: u32,
    /// Free-text description.
    pub description: String,
    /// Picture URL; blank means none.
    pub image: Option<String>,
}

/// Product changes; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New brand.
    pub brand: Option<String>,
    /// New unit price in cents.
    pub price_cents: Option<u64>,
    /// Stock count after a delivery or stock take.
    pub stock_quantity: Option<u32>,
    /// New description.
    pub description: Option<String>,
    /// `Some(None)` removes the picture.
    pub image: Option<Option<String>>,
}

fn required(field: &'static str, value: &str) -> Result<String, CatalogueError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogueError::invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_owned())
}

fn image_url(value: Option<String>) -> Option<String> {
    value
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
}

impl Product {
    /// Validate a draft into a product.
    pub fn new(id: ProductId, draft: ProductDraft) -> Result<Self, CatalogueError> {
        Ok(Self {
            id,
            name: required("name", &draft.name)?,
            brand: required("brand", &draft.brand)?,
            price_cents: draft.price_cents,
            stock_quantity: draft.stock_quantity,
            description: draft.description.trim().to_owned(),
            image: image_url(draft.image),
        })
    }

    /// Apply an update. Nothing changes when any field is invalid.
    pub fn apply(&mut self, update: ProductUpdate) -> Result<(), CatalogueError> {
        let name = update
            .name
            .as_deref()
            .map(|v| required("name", v))
            .transpose()?;
        let brand = update
            .brand
            .as_deref()
            .map(|v| required("brand", v))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(brand) = brand {
            self.brand = brand;
        }
        if let Some(price) = update.price_cents {
            self.price_cents = price;
        }
        if let Some(quantity) = update.stock_quantity {
            self.stock_quantity = quantity;
        }
        if let Some(description) = update.description {
            self.description = description.trim().to_owned();
        }
        if let Some(image) = update.image {
            self.image = image_url(image);
        }
        Ok(())
    }

    /// `price_cents * stock_quantity`, saturating.
    pub fn stock_value_cents(&self) -> u64 {
        self.price_cents.saturating_mul(u64::from(self.stock_quantity))
    }
}

/// Case-insensitive search over product name, brand and description.
///
/// A blank term returns every product. Input order is preserved.
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|product| {
            needle.is_empty()
                || [&product.name, &product.brand, &product.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Totals across the whole catalogue, independent of any search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueSummary {
    /// Number of products.
    pub total_products: usize,
    /// Units in stock across all products.
    pub total_stock: u64,
    /// Sum of `priceCents * stockQuantity`.
    pub inventory_value_cents: u64,
}

impl CatalogueSummary {
    /// Summarise `products`.
    pub fn of(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |summary, product| Self {
            total_products: summary.total_products + 1,
            total_stock: summary.total_stock + u64::from(product.stock_quantity),
            inventory_value_cents: summary
                .inventory_value_cents
                .saturating_add(product.stock_value_cents()),
        })
    }
}
