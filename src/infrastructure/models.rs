use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    DeliveryStatus, OrderItemView, OrderView, PaymentMethod, PaymentStatus,
};
use crate::domain::product::ProductView;
use crate::schema::{order_items, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub delivery_status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub delivery_status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub address: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
    pub position: i32,
}

impl From<ProductRow> for ProductView {
    fn from(row: ProductRow) -> Self {
        ProductView {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            image_ref: row.image_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl OrderRow {
    /// Stored status strings are written exclusively from the typed enums, so
    /// a parse failure here means the row was tampered with out of band.
    pub fn into_view(self, items: Vec<OrderItemView>) -> Result<OrderView, DomainError> {
        let delivery_status = DeliveryStatus::parse(&self.delivery_status).ok_or_else(|| {
            DomainError::Storage(format!("corrupt delivery_status '{}'", self.delivery_status))
        })?;
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            DomainError::Storage(format!("corrupt payment_status '{}'", self.payment_status))
        })?;
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            DomainError::Storage(format!("corrupt payment_method '{}'", self.payment_method))
        })?;
        Ok(OrderView {
            id: self.id,
            user_id: self.user_id,
            email: self.email,
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
            delivery_status,
            payment_status,
            payment_method,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

impl OrderItemRow {
    pub fn into_view(self, image_ref: Option<String>) -> OrderItemView {
        OrderItemView {
            id: self.id,
            product_id: self.product_id,
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            line_total: self.line_total,
            image_ref,
        }
    }
}
