use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::OrderService;
use crate::domain::identity::Identity;
use crate::domain::order::{
    DeliveryStatus, OrderIntent, OrderItemInput, OrderItemView, OrderPatch, OrderView,
    PaymentMethod, PaymentStatus, StatusPatch,
};
use crate::errors::AppError;
use crate::infrastructure::DieselOrderRepository;

type Orders = web::Data<OrderService<DieselOrderRepository>>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    /// Free-form; unknown values normalize to "COD".
    pub payment_method: String,
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditOrderRequest {
    pub items: Option<Vec<OrderItemRequest>>,
    pub subtotal: Option<String>,
    pub delivery_fee: Option<String>,
    pub total: Option<String>,
    pub delivery_status: Option<String>,
    pub payment_status: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub delivery_status: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
    pub image_ref: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    pub delivery_status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        OrderItemResponse {
            id: item.id,
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            line_total: item.line_total.to_string(),
            image_ref: item.image_ref,
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            email: order.email,
            subtotal: order.subtotal.to_string(),
            delivery_fee: order.delivery_fee.to_string(),
            total: order.total.to_string(),
            delivery_status: order.delivery_status.to_string(),
            payment_status: order.payment_status.to_string(),
            payment_method: order.payment_method.to_string(),
            address: order.address,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────────────

pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid {field} '{raw}': {e}")))
}

fn parse_items(items: Vec<OrderItemRequest>) -> Result<Vec<OrderItemInput>, AppError> {
    items
        .into_iter()
        .map(|item| {
            Ok(OrderItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: parse_decimal("price", &item.price)?,
            })
        })
        .collect()
}

fn parse_delivery_status(raw: &str) -> Result<DeliveryStatus, AppError> {
    DeliveryStatus::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("invalid deliveryStatus '{raw}'")))
}

fn parse_payment_status(raw: &str) -> Result<PaymentStatus, AppError> {
    PaymentStatus::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("invalid paymentStatus '{raw}'")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/v1/orders
///
/// Creates an order and reserves stock for every line item inside a single
/// database transaction; any item with insufficient stock aborts the whole
/// request.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid input, unknown product or insufficient stock"),
        (status = 403, description = "Missing or invalid identity"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: Orders,
    identity: Identity,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let intent = OrderIntent {
        items: parse_items(body.items)?,
        subtotal: parse_decimal("subtotal", &body.subtotal)?,
        delivery_fee: parse_decimal("deliveryFee", &body.delivery_fee)?,
        total: parse_decimal("total", &body.total)?,
        payment_method: PaymentMethod::normalize(&body.payment_method),
        address: body.address,
    };

    let order = web::block(move || service.create_order(&identity, intent))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/v1/orders/my-orders
#[utoipa::path(
    get,
    path = "/api/v1/orders/my-orders",
    responses(
        (status = 200, description = "The requestor's orders, newest first", body = [OrderResponse]),
        (status = 403, description = "Missing or invalid identity"),
    ),
    tag = "orders"
)]
pub async fn list_my_orders(service: Orders, identity: Identity) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_my_orders(&identity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/v1/orders — back-office listing, privileged roles only.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "All orders, newest first", body = [OrderResponse]),
        (status = 403, description = "Requestor is not admin or superadmin"),
    ),
    tag = "orders"
)]
pub async fn list_all_orders(
    service: Orders,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_all_orders(&identity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/v1/orders/{id} — owner-only; a foreign order looks like a 404.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order absent or owned by someone else"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: Orders,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || service.get_order(order_id, &identity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /api/v1/orders/{id}
///
/// Partial update. Supplying `items` replaces the whole item set: old
/// quantities are restored to stock and the new ones reserved, all inside one
/// transaction.
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = EditOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Invalid patch, unknown product or insufficient stock"),
        (status = 404, description = "Order absent or owned by someone else"),
    ),
    tag = "orders"
)]
pub async fn edit_order(
    service: Orders,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<EditOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();

    let patch = OrderPatch {
        items: body.items.map(parse_items).transpose()?,
        subtotal: body
            .subtotal
            .map(|s| parse_decimal("subtotal", &s))
            .transpose()?,
        delivery_fee: body
            .delivery_fee
            .map(|s| parse_decimal("deliveryFee", &s))
            .transpose()?,
        total: body.total.map(|s| parse_decimal("total", &s)).transpose()?,
        delivery_status: body
            .delivery_status
            .map(|s| parse_delivery_status(&s))
            .transpose()?,
        payment_status: body
            .payment_status
            .map(|s| parse_payment_status(&s))
            .transpose()?,
        address: body.address,
    };

    let order = web::block(move || service.edit_order(order_id, &identity, patch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /api/v1/orders/{id}/status — privileged, ignores ownership.
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Illegal status transition"),
        (status = 403, description = "Requestor is not admin or superadmin"),
        (status = 404, description = "No such order"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: Orders,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let patch = StatusPatch {
        delivery_status: body
            .delivery_status
            .map(|s| parse_delivery_status(&s))
            .transpose()?,
        payment_status: body
            .payment_status
            .map(|s| parse_payment_status(&s))
            .transpose()?,
    };

    let order = web::block(move || service.update_status(order_id, &identity, patch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /api/v1/orders/{id}
///
/// Restores stock for every item and removes the order, all-or-nothing.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order deleted, stock restored"),
        (status = 404, description = "Order absent or owned by someone else"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: Orders,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    web::block(move || service.delete_order(order_id, &identity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;
    Ok(HttpResponse::NoContent().finish())
}
