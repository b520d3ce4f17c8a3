pub mod models;
pub mod order_repo;
pub mod product_repo;

pub use order_repo::DieselOrderRepository;
pub use product_repo::DieselProductRepository;

use diesel::pg::PgConnection;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::Connection;

use crate::domain::errors::DomainError;

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Error type for transaction closures: lets `?` carry both Diesel errors
/// (which drive rollback and the transient-retry decision) and domain errors
/// (which abort the transaction and surface as-is).
#[derive(Debug)]
pub(crate) enum TxError {
    Domain(DomainError),
    Diesel(DieselError),
}

impl From<DieselError> for TxError {
    fn from(e: DieselError) -> Self {
        TxError::Diesel(e)
    }
}

impl From<DomainError> for TxError {
    fn from(e: DomainError) -> Self {
        TxError::Domain(e)
    }
}

impl TxError {
    fn into_domain(self) -> DomainError {
        match self {
            TxError::Domain(e) => e,
            TxError::Diesel(e) => DomainError::Storage(e.to_string()),
        }
    }
}

/// Serialization failures (40001) and deadlocks (40P01) are both safe to
/// retry: the aborted transaction changed nothing. Diesel has no dedicated
/// kind for deadlocks, so those arrive as `Unknown` and are matched on the
/// server message.
fn is_transient(e: &DieselError) -> bool {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => true,
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => {
            info.message().contains("deadlock detected")
        }
        _ => false,
    }
}

/// Run `f` inside a transaction, retrying exactly once on a transient
/// conflict (serialization failure or deadlock). Every other failure rolls
/// back and surfaces immediately.
pub(crate) fn with_tx_retry<T, F>(conn: &mut PgConnection, mut f: F) -> Result<T, DomainError>
where
    F: FnMut(&mut PgConnection) -> Result<T, TxError>,
{
    let mut retried = false;
    loop {
        match conn.transaction::<_, TxError, _>(&mut f) {
            Ok(value) => return Ok(value),
            Err(TxError::Diesel(e)) if !retried && is_transient(&e) => {
                log::warn!("transient storage conflict, retrying once: {e}");
                retried = true;
            }
            Err(e) => return Err(e.into_domain()),
        }
    }
}
