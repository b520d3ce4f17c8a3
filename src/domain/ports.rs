use uuid::Uuid;

use super::errors::DomainError;
use super::identity::Identity;
use super::order::{OrderIntent, OrderPatch, OrderView, StatusPatch};
use super::product::{NewProductInput, ProductPatch, ProductView};

/// Persistence port for the order lifecycle. Implementations own the
/// transaction boundaries: every multi-record stock mutation they perform is
/// all-or-nothing.
pub trait OrderRepository: Send + Sync + 'static {
    /// Persist a new order, reserving stock for every line item inside the
    /// same transaction.
    fn create(&self, identity: &Identity, intent: OrderIntent) -> Result<OrderView, DomainError>;

    /// Owner-scoped fetch; absent and not-owned are indistinguishable.
    fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<OrderView, DomainError>;

    fn list_for_user(&self, owner_id: Uuid) -> Result<Vec<OrderView>, DomainError>;

    fn list_all(&self) -> Result<Vec<OrderView>, DomainError>;

    /// Owner-scoped partial update. Replacing the item set restores the old
    /// items' stock and reserves the new items' stock atomically.
    fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: OrderPatch,
    ) -> Result<OrderView, DomainError>;

    /// Status-only update, no ownership scoping and no stock interaction.
    fn update_status(&self, id: Uuid, patch: StatusPatch) -> Result<OrderView, DomainError>;

    /// Restore stock for every item, then remove the order. All-or-nothing.
    fn delete_owned(&self, id: Uuid, owner_id: Uuid, privileged: bool)
        -> Result<(), DomainError>;
}

/// Persistence port for the product catalog.
pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, input: NewProductInput) -> Result<ProductView, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;

    fn list(&self) -> Result<Vec<ProductView>, DomainError>;

    fn update(&self, id: Uuid, patch: ProductPatch) -> Result<ProductView, DomainError>;

    fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Atomic check-then-set stock adjustment; a negative `delta` that would
    /// drive stock below zero fails with `InsufficientStock` and changes
    /// nothing.
    fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<ProductView, DomainError>;
}
