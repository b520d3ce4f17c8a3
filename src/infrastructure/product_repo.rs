use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProductInput, ProductPatch, ProductView};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};
use super::{with_tx_retry, TxError};

/// Apply a stock delta as a single conditional UPDATE on the current
/// connection. The `stock >= -delta` guard makes the check-then-set atomic:
/// under concurrent callers the database evaluates it against the
/// transactionally-consistent value, so stock can never go negative.
///
/// Order transactions call this for every line item; running it on their
/// connection keeps each adjustment inside the caller's transaction.
pub(crate) fn adjust_stock_on(
    conn: &mut PgConnection,
    product_id: Uuid,
    delta: i32,
) -> Result<ProductRow, TxError> {
    let row = diesel::update(
        products::table.filter(products::id.eq(product_id).and(products::stock.ge(-delta))),
    )
    .set((
        products::stock.eq(products::stock + delta),
        products::updated_at.eq(Utc::now()),
    ))
    .returning(ProductRow::as_returning())
    .get_result(conn)
    .optional()?;

    match row {
        Some(row) => Ok(row),
        None => {
            // Zero rows matched: either the product is gone or the guard
            // failed. Look the name up to tell the two apart.
            let name = products::table
                .filter(products::id.eq(product_id))
                .select(products::name)
                .first::<String>(conn)
                .optional()?;
            match name {
                None => Err(DomainError::UnknownProduct(product_id).into()),
                Some(product) => Err(DomainError::InsufficientStock { product }.into()),
            }
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
struct ProductChanges {
    name: Option<String>,
    description: Option<String>,
    price: Option<BigDecimal>,
    stock: Option<i32>,
    image_ref: Option<Option<String>>,
    updated_at: DateTime<Utc>,
}

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, input: NewProductInput) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        let row: ProductRow = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: input.name,
                description: input.description,
                price: input.price,
                stock: input.stock,
                image_ref: input.image_ref,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(row.map(Into::into))
    }

    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn update(&self, id: Uuid, patch: ProductPatch) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        let changes = ProductChanges {
            name: patch.name,
            description: patch.description,
            price: patch.price,
            stock: patch.stock,
            image_ref: patch.image_ref,
            updated_at: Utc::now(),
        };
        let row: Option<ProductRow> = diesel::update(products::table.filter(products::id.eq(id)))
            .set(&changes)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        row.map(Into::into).ok_or(DomainError::NotFound)
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.filter(products::id.eq(id)))
            .execute(&mut conn)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        let row = with_tx_retry(&mut conn, |conn| adjust_stock_on(conn, id, delta))?;
        Ok(row.into())
    }
}
