//! Product catalogue handlers.
//!
//! ```text
//! GET    /api/v1/products?search&page&pageSize
//! GET    /api/v1/products/summary
//! POST   /api/v1/products
//! GET    /api/v1/products/{id}
//! PATCH  /api/v1/products/{id}
//! DELETE /api/v1/products/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CatalogueSummary, Error, Product, ProductDraft, ProductId, ProductUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::{ErrorSchema, ProductPageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, page_request, parse_id};

/// Product response payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    #[schema(value_type = String, example = "PRODUCT-001")]
    pub id: ProductId,
    #[schema(example = "Security Camera")]
    pub name: String,
    #[schema(example = "Hikvision")]
    pub brand: String,
    /// Unit price in cents.
    #[schema(example = 29999)]
    pub price_cents: u64,
    #[schema(example = 45)]
    pub stock_quantity: u32,
    pub description: String,
    pub image: Option<String>,
}

impl From<&Product> for ProductBody {
    fn from(value: &Product) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            brand: value.brand.clone(),
            price_cents: value.price_cents,
            stock_quantity: value.stock_quantity,
            description: value.description.clone(),
            image: value.image.clone(),
        }
    }
}

/// Catalogue totals.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueSummaryBody {
    pub total_products: usize,
    pub total_stock: u64,
    /// Sum of `priceCents * stockQuantity`.
    pub inventory_value_cents: u64,
}

impl From<CatalogueSummary> for CatalogueSummaryBody {
    fn from(value: CatalogueSummary) -> Self {
        Self {
            total_products: value.total_products,
            total_stock: value.total_stock,
            inventory_value_cents: value.inventory_value_cents,
        }
    }
}

/// New product.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequestBody {
    pub name: String,
    pub brand: String,
    pub price_cents: u64,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
}

/// Product changes; absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateBody {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price_cents: Option<u64>,
    pub stock_quantity: Option<u32>,
    pub description: Option<String>,
    /// A blank string removes the picture.
    pub image: Option<String>,
}

/// Product list parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductListQuery {
    /// Substring of the name, brand or description.
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn parse_product_id(raw: &str) -> Result<ProductId, Error> {
    parse_id(raw, FieldName::new("id"), ProductId::parse)
}

/// Search and page the catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductPageSchema),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security(("ActorHeaders" = []))
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    actor: ActorContext,
    req: HttpRequest,
    query: web::Query<ProductListQuery>,
) -> ApiResult<HttpResponse> {
    let ProductListQuery {
        search,
        page,
        page_size,
    } = query.into_inner();
    let page = page_request(page, page_size, state.paging)?;
    let products = state
        .products
        .list_products(actor.actor(), search, page)
        .await?;
    let envelope = products
        .map(|product| ProductBody::from(&product))
        .into_envelope(&req.full_url());
    Ok(HttpResponse::Ok().json(envelope))
}

/// Totals across the whole catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/products/summary",
    responses(
        (status = 200, description = "Catalogue totals", body = CatalogueSummaryBody),
        (status = 403, description = "Not permitted", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "catalogueSummary",
    security(("ActorHeaders" = []))
)]
#[get("/products/summary")]
pub async fn catalogue_summary(
    state: web::Data<HttpState>,
    actor: ActorContext,
) -> ApiResult<web::Json<CatalogueSummaryBody>> {
    let summary = state.products.summary(actor.actor()).await?;
    Ok(web::Json(summary.into()))
}

/// Add a product.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductRequestBody,
    responses(
        (status = 201, description = "Product added", body = ProductBody),
        (status = 400, description = "Invalid product", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct",
    security(("ActorHeaders" = []))
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<ProductRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = ProductDraft {
        name: body.name,
        brand: body.brand,
        price_cents: body.price_cents,
        stock_quantity: body.stock_quantity,
        description: body.description,
        image: body.image,
    };
    let product = state.products.create_product(actor.actor(), draft).await?;
    Ok(HttpResponse::Created().json(ProductBody::from(&product)))
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductBody),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security(("ActorHeaders" = []))
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductBody>> {
    let product_id = parse_product_id(&path)?;
    let product = state
        .products
        .get_product(actor.actor(), &product_id)
        .await?;
    Ok(web::Json(ProductBody::from(&product)))
}

/// Change a product's details, price or stock.
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductUpdateBody,
    responses(
        (status = 200, description = "Updated product", body = ProductBody),
        (status = 400, description = "Invalid update", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "updateProduct",
    security(("ActorHeaders" = []))
)]
#[patch("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<ProductUpdateBody>,
) -> ApiResult<web::Json<ProductBody>> {
    let product_id = parse_product_id(&path)?;
    let body = payload.into_inner();
    let update = ProductUpdate {
        name: body.name,
        brand: body.brand,
        price_cents: body.price_cents,
        stock_quantity: body.stock_quantity,
        description: body.description,
        image: body.image.map(Some),
    };
    let product = state
        .products
        .update_product(actor.actor(), &product_id, update)
        .await?;
    Ok(web::Json(ProductBody::from(&product)))
}

/// Remove a product from the catalogue.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product removed"),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "deleteProduct",
    security(("ActorHeaders" = []))
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path)?;
    state
        .products
        .delete_product(actor.actor(), &product_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Catalogue handler tests over the seeded in-memory stores.

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::Actor;
    use crate::inbound::http::test_utils::{
        admin, as_actor, mike, operator, seeded_state, test_app,
    };

    #[actix_web::test]
    async fn admins_add_products_and_technicians_find_them() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::post().uri("/api/v1/products"), &admin())
            .set_json(json!({
                "name": "Cisco Router",
                "brand": "Cisco",
                "priceCents": 59_999,
                "stockQuantity": 8,
                "description": "Enterprise-grade router"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let product: Value = test::read_body_json(res).await;
        assert_eq!(product["id"], "PRODUCT-002");
        assert_eq!(product["image"], Value::Null);

        let req = as_actor(TestRequest::get().uri("/api/v1/products?search=cisco"), &mike())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["brand"], "Cisco");
        assert_eq!(body["data"][0]["stockQuantity"], 8);
    }

    #[actix_web::test]
    async fn summary_ignores_search_and_paging() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::get().uri("/api/v1/products/summary"), &mike())
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            summary,
            json!({
                "totalProducts": 1,
                "totalStock": 45,
                "inventoryValueCents": 1_349_955
            })
        );
    }

    #[actix_web::test]
    async fn stock_takes_update_the_product() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::patch().uri("/api/v1/products/PRODUCT-001"), &admin())
            .set_json(json!({ "stockQuantity": 40, "image": "https://cdn.test/cam.png" }))
            .to_request();
        let product: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(product["stockQuantity"], 40);
        assert_eq!(product["image"], "https://cdn.test/cam.png");
        assert_eq!(product["name"], "Security Camera");

        let req = as_actor(TestRequest::patch().uri("/api/v1/products/PRODUCT-001"), &admin())
            .set_json(json!({ "brand": "" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error: Value = test::read_body_json(res).await;
        assert_eq!(error["details"]["field"], "brand");
    }

    #[actix_web::test]
    async fn deleted_products_are_gone() {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::delete().uri("/api/v1/products/PRODUCT-001"), &admin())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let req = as_actor(TestRequest::get().uri("/api/v1/products/PRODUCT-001"), &admin())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let error: Value = test::read_body_json(res).await;
        assert_eq!(error["details"]["code"], "product_not_found");
    }

    #[rstest]
    #[case(mike())]
    #[case(operator())]
    #[actix_web::test]
    async fn only_admins_change_the_catalogue(#[case] actor: Actor) {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::delete().uri("/api/v1/products/PRODUCT-001"), &actor)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case(json!({ "name": "Drill", "brand": "Bosch", "priceCents": -1 }))]
    #[case(json!({ "name": "Drill", "brand": "Bosch", "priceCents": 100, "stockQuantity": -3 }))]
    #[case(json!({ "name": "Drill", "brand": "Bosch", "priceCents": 19.99 }))]
    #[actix_web::test]
    async fn prices_and_stock_must_be_whole_non_negative_numbers(#[case] body: Value) {
        let app = test::init_service(test_app(seeded_state().await)).await;

        let req = as_actor(TestRequest::post().uri("/api/v1/products"), &admin())
            .set_json(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error: Value = test::read_body_json(res).await;
        assert_eq!(error["code"], "invalid_request");
    }
}
