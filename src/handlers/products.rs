use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::CatalogService;
use crate::domain::identity::Identity;
use crate::domain::product::{NewProductInput, ProductPatch, ProductView};
use crate::errors::AppError;
use crate::infrastructure::DieselProductRepository;

use super::orders::parse_decimal;

type Catalog = web::Data<CatalogService<DieselProductRepository>>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as a string, e.g. "120.00"
    pub price: String,
    #[serde(default)]
    pub stock: i32,
    pub image_ref: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i32>,
    /// Present-and-null clears the image reference.
    #[serde(default, deserialize_with = "double_option")]
    pub image_ref: Option<Option<String>>,
}

/// Distinguishes an absent field (outer None) from an explicit null
/// (Some(None)); serde's default Option handling collapses the two.
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecreaseStockRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: i32,
    pub image_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductView> for ProductResponse {
    fn from(p: ProductView) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            stock: p.stock,
            image_ref: p.image_ref,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    responses((status = 200, description = "All products", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(service: Catalog) -> Result<HttpResponse, AppError> {
    let products = web::block(move || service.list_products())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "No such product"),
    ),
    tag = "products"
)]
pub async fn get_product(
    service: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = web::block(move || service.get_product(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /api/products — privileged.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Requestor is not admin or superadmin"),
    ),
    tag = "products"
)]
pub async fn create_product(
    service: Catalog,
    identity: Identity,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = NewProductInput {
        name: body.name,
        description: body.description,
        price: parse_decimal("price", &body.price)?,
        stock: body.stock,
        image_ref: body.image_ref,
    };
    let product = web::block(move || service.create_product(&identity, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PATCH /api/products/{id} — privileged.
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Requestor is not admin or superadmin"),
        (status = 404, description = "No such product"),
    ),
    tag = "products"
)]
pub async fn update_product(
    service: Catalog,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let patch = ProductPatch {
        name: body.name,
        description: body.description,
        price: body.price.map(|p| parse_decimal("price", &p)).transpose()?,
        stock: body.stock,
        image_ref: body.image_ref,
    };
    let product = web::block(move || service.update_product(id, &identity, patch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /api/products/{id} — privileged.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Requestor is not admin or superadmin"),
        (status = 404, description = "No such product"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    service: Catalog,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || service.delete_product(id, &identity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/products/{id}/decrease-stock
///
/// Direct stock decrement used by collaborators outside the order flow. The
/// same conditional update as order reservation, so it can never drive stock
/// negative.
#[utoipa::path(
    patch,
    path = "/api/products/{id}/decrease-stock",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = DecreaseStockRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 400, description = "Insufficient stock or invalid quantity"),
    ),
    tag = "products"
)]
pub async fn decrease_stock(
    service: Catalog,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<DecreaseStockRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let product = web::block(move || service.decrease_stock(id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
