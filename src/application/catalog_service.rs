use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::Identity;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProductInput, ProductPatch, ProductView};

/// Catalog use cases. Reads are public; writes are gated to privileged roles.
pub struct CatalogService<P> {
    repo: P,
}

impl<P: ProductRepository> CatalogService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    pub fn get_product(&self, id: Uuid) -> Result<ProductView, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn list_products(&self) -> Result<Vec<ProductView>, DomainError> {
        self.repo.list()
    }

    pub fn create_product(
        &self,
        identity: &Identity,
        input: NewProductInput,
    ) -> Result<ProductView, DomainError> {
        if !identity.role.can_manage_catalog() {
            return Err(DomainError::Unauthorized);
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::InvalidRequest("name must not be blank".into()));
        }
        if input.price < BigDecimal::zero() {
            return Err(DomainError::InvalidRequest("price must not be negative".into()));
        }
        if input.stock < 0 {
            return Err(DomainError::InvalidRequest("stock must not be negative".into()));
        }
        self.repo.create(input)
    }

    pub fn update_product(
        &self,
        id: Uuid,
        identity: &Identity,
        patch: ProductPatch,
    ) -> Result<ProductView, DomainError> {
        if !identity.role.can_manage_catalog() {
            return Err(DomainError::Unauthorized);
        }
        if let Some(price) = &patch.price {
            if price < &BigDecimal::zero() {
                return Err(DomainError::InvalidRequest("price must not be negative".into()));
            }
        }
        if let Some(stock) = patch.stock {
            if stock < 0 {
                return Err(DomainError::InvalidRequest("stock must not be negative".into()));
            }
        }
        self.repo.update(id, patch)
    }

    pub fn delete_product(&self, id: Uuid, identity: &Identity) -> Result<(), DomainError> {
        if !identity.role.can_manage_catalog() {
            return Err(DomainError::Unauthorized);
        }
        self.repo.delete(id)
    }

    /// Direct stock decrement used by external collaborators (e.g. a kiosk
    /// checkout path that bypasses order placement).
    pub fn decrease_stock(&self, id: Uuid, quantity: i32) -> Result<ProductView, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidRequest(
                "quantity must be at least 1".into(),
            ));
        }
        self.repo.adjust_stock(id, -quantity)
    }
}
