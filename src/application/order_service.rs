use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::Identity;
use crate::domain::order::{OrderIntent, OrderItemInput, OrderPatch, OrderView, StatusPatch};
use crate::domain::ports::OrderRepository;

/// Use cases of the order lifecycle: input validation, role gating and status
/// rules live here; transactions and stock arithmetic live behind the
/// repository port.
pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_order(
        &self,
        identity: &Identity,
        intent: OrderIntent,
    ) -> Result<OrderView, DomainError> {
        validate_items(&intent.items)?;
        validate_amounts(&intent.subtotal, &intent.delivery_fee, &intent.total)?;
        if intent.address.trim().is_empty() {
            return Err(DomainError::InvalidRequest("address must not be blank".into()));
        }
        self.repo.create(identity, intent)
    }

    pub fn get_order(&self, id: Uuid, identity: &Identity) -> Result<OrderView, DomainError> {
        self.repo.find_owned(id, identity.user_id)
    }

    /// The requestor's own orders, newest first.
    pub fn list_my_orders(&self, identity: &Identity) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_for_user(identity.user_id)
    }

    /// Back-office listing across all users; privileged roles only.
    pub fn list_all_orders(&self, identity: &Identity) -> Result<Vec<OrderView>, DomainError> {
        if !identity.role.can_list_all_orders() {
            return Err(DomainError::Unauthorized);
        }
        self.repo.list_all()
    }

    pub fn edit_order(
        &self,
        id: Uuid,
        identity: &Identity,
        patch: OrderPatch,
    ) -> Result<OrderView, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::InvalidRequest("empty patch".into()));
        }
        if let Some(items) = &patch.items {
            validate_items(items)?;
        }
        for (field, value) in [
            ("subtotal", &patch.subtotal),
            ("deliveryFee", &patch.delivery_fee),
            ("total", &patch.total),
        ] {
            if let Some(v) = value {
                if v < &BigDecimal::zero() {
                    return Err(DomainError::InvalidRequest(format!(
                        "{field} must not be negative"
                    )));
                }
            }
        }
        if let Some(address) = &patch.address {
            if address.trim().is_empty() {
                return Err(DomainError::InvalidRequest("address must not be blank".into()));
            }
        }
        self.repo.update_owned(id, identity.user_id, patch)
    }

    /// Privileged status-only update; no ownership check by design.
    pub fn update_status(
        &self,
        id: Uuid,
        identity: &Identity,
        patch: StatusPatch,
    ) -> Result<OrderView, DomainError> {
        if !identity.role.can_update_order_status() {
            return Err(DomainError::Unauthorized);
        }
        if patch.delivery_status.is_none() && patch.payment_status.is_none() {
            return Err(DomainError::InvalidRequest("empty status patch".into()));
        }
        self.repo.update_status(id, patch)
    }

    pub fn delete_order(&self, id: Uuid, identity: &Identity) -> Result<(), DomainError> {
        self.repo
            .delete_owned(id, identity.user_id, identity.role.is_privileged())
    }
}

fn validate_items(items: &[OrderItemInput]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidRequest("items must not be empty".into()));
    }
    for item in items {
        if item.quantity < 1 {
            return Err(DomainError::InvalidRequest(format!(
                "quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        if item.unit_price < BigDecimal::zero() {
            return Err(DomainError::InvalidRequest(format!(
                "price for product {} must not be negative",
                item.product_id
            )));
        }
    }
    Ok(())
}

fn validate_amounts(
    subtotal: &BigDecimal,
    delivery_fee: &BigDecimal,
    total: &BigDecimal,
) -> Result<(), DomainError> {
    if subtotal < &BigDecimal::zero() || delivery_fee < &BigDecimal::zero() {
        return Err(DomainError::InvalidRequest(
            "subtotal and deliveryFee must not be negative".into(),
        ));
    }
    if total <= &BigDecimal::zero() {
        return Err(DomainError::InvalidRequest("total must be positive".into()));
    }
    if total != &(subtotal + delivery_fee) {
        return Err(DomainError::InvalidRequest(
            "total must equal subtotal + deliveryFee".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::domain::identity::Role;
    use crate::domain::order::{DeliveryStatus, PaymentMethod, PaymentStatus};

    /// Records calls and serves canned orders; no stock arithmetic. The
    /// transactional behaviour is covered by the repository's own tests.
    #[derive(Default)]
    struct FakeRepo {
        orders: Mutex<Vec<OrderView>>,
    }

    impl FakeRepo {
        fn with_order(order: OrderView) -> Self {
            Self {
                orders: Mutex::new(vec![order]),
            }
        }
    }

    fn sample_order(user_id: Uuid) -> OrderView {
        OrderView {
            id: Uuid::new_v4(),
            user_id,
            email: "ana@example.com".into(),
            subtotal: BigDecimal::from(200),
            delivery_fee: BigDecimal::from(50),
            total: BigDecimal::from(250),
            delivery_status: DeliveryStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::Cod,
            address: "somewhere".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![],
        }
    }

    impl OrderRepository for FakeRepo {
        fn create(
            &self,
            identity: &Identity,
            intent: OrderIntent,
        ) -> Result<OrderView, DomainError> {
            let order = OrderView {
                id: Uuid::new_v4(),
                user_id: identity.user_id,
                email: identity.email.clone(),
                subtotal: intent.subtotal,
                delivery_fee: intent.delivery_fee,
                total: intent.total,
                delivery_status: DeliveryStatus::Pending,
                payment_status: intent.payment_method.initial_payment_status(),
                payment_method: intent.payment_method,
                address: intent.address,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                items: vec![],
            };
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        }

        fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<OrderView, DomainError> {
            self.orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id && o.user_id == owner_id)
                .cloned()
                .ok_or(DomainError::NotFoundOrUnauthorized)
        }

        fn list_for_user(&self, owner_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.user_id == owner_id)
                .cloned()
                .collect())
        }

        fn list_all(&self) -> Result<Vec<OrderView>, DomainError> {
            Ok(self.orders.lock().unwrap().clone())
        }

        fn update_owned(
            &self,
            id: Uuid,
            owner_id: Uuid,
            _patch: OrderPatch,
        ) -> Result<OrderView, DomainError> {
            self.find_owned(id, owner_id)
        }

        fn update_status(&self, id: Uuid, _patch: StatusPatch) -> Result<OrderView, DomainError> {
            self.orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id)
                .cloned()
                .ok_or(DomainError::NotFound)
        }

        fn delete_owned(
            &self,
            id: Uuid,
            owner_id: Uuid,
            privileged: bool,
        ) -> Result<(), DomainError> {
            let mut orders = self.orders.lock().unwrap();
            let before = orders.len();
            orders.retain(|o| !(o.id == id && (privileged || o.user_id == owner_id)));
            if orders.len() == before {
                Err(DomainError::NotFoundOrUnauthorized)
            } else {
                Ok(())
            }
        }
    }

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            role,
        }
    }

    fn valid_intent() -> OrderIntent {
        OrderIntent {
            items: vec![OrderItemInput {
                product_id: Uuid::new_v4(),
                quantity: 2,
                unit_price: BigDecimal::from(100),
            }],
            subtotal: BigDecimal::from(200),
            delivery_fee: BigDecimal::from(50),
            total: BigDecimal::from(250),
            payment_method: PaymentMethod::Cod,
            address: "221B Baker St".into(),
        }
    }

    #[test]
    fn create_rejects_empty_items() {
        let svc = OrderService::new(FakeRepo::default());
        let mut intent = valid_intent();
        intent.items.clear();
        let err = svc.create_order(&identity(Role::User), intent).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn create_rejects_zero_quantity() {
        let svc = OrderService::new(FakeRepo::default());
        let mut intent = valid_intent();
        intent.items[0].quantity = 0;
        let err = svc.create_order(&identity(Role::User), intent).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn create_rejects_total_mismatch() {
        let svc = OrderService::new(FakeRepo::default());
        let mut intent = valid_intent();
        intent.total = BigDecimal::from(999);
        let err = svc.create_order(&identity(Role::User), intent).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn create_rejects_blank_address() {
        let svc = OrderService::new(FakeRepo::default());
        let mut intent = valid_intent();
        intent.address = "   ".into();
        let err = svc.create_order(&identity(Role::User), intent).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn cod_order_defaults_to_pending_unpaid() {
        let svc = OrderService::new(FakeRepo::default());
        let order = svc
            .create_order(&identity(Role::User), valid_intent())
            .unwrap();
        assert_eq!(order.delivery_status, DeliveryStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.payment_method, PaymentMethod::Cod);
    }

    #[test]
    fn prepaid_order_defaults_to_paid() {
        let svc = OrderService::new(FakeRepo::default());
        let mut intent = valid_intent();
        intent.payment_method = PaymentMethod::Gcash;
        let order = svc.create_order(&identity(Role::User), intent).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn non_owner_get_is_indistinguishable_from_missing() {
        let owner = identity(Role::User);
        let stranger = identity(Role::User);
        let order = sample_order(owner.user_id);
        let order_id = order.id;
        let svc = OrderService::new(FakeRepo::with_order(order));

        let for_stranger = svc.get_order(order_id, &stranger).unwrap_err();
        let for_missing = svc.get_order(Uuid::new_v4(), &owner).unwrap_err();
        assert!(matches!(for_stranger, DomainError::NotFoundOrUnauthorized));
        assert!(matches!(for_missing, DomainError::NotFoundOrUnauthorized));
    }

    #[test]
    fn list_all_requires_privileged_role() {
        let svc = OrderService::new(FakeRepo::default());
        let err = svc.list_all_orders(&identity(Role::User)).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
        assert!(svc.list_all_orders(&identity(Role::Admin)).is_ok());
        assert!(svc.list_all_orders(&identity(Role::Superadmin)).is_ok());
    }

    #[test]
    fn update_status_requires_privileged_role() {
        let svc = OrderService::new(FakeRepo::default());
        let patch = StatusPatch {
            delivery_status: Some(DeliveryStatus::Processing),
            payment_status: None,
        };
        let err = svc
            .update_status(Uuid::new_v4(), &identity(Role::User), patch.clone())
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));

        let err = svc
            .update_status(Uuid::new_v4(), &identity(Role::Admin), patch)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn empty_status_patch_is_invalid() {
        let svc = OrderService::new(FakeRepo::default());
        let err = svc
            .update_status(
                Uuid::new_v4(),
                &identity(Role::Admin),
                StatusPatch::default(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn edit_rejects_empty_patch() {
        let svc = OrderService::new(FakeRepo::default());
        let err = svc
            .edit_order(Uuid::new_v4(), &identity(Role::User), OrderPatch::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn edit_accepts_zero_delivery_fee() {
        let owner = identity(Role::User);
        let order = sample_order(owner.user_id);
        let order_id = order.id;
        let svc = OrderService::new(FakeRepo::with_order(order));

        let patch = OrderPatch {
            delivery_fee: Some(BigDecimal::zero()),
            ..Default::default()
        };
        assert!(svc.edit_order(order_id, &owner, patch).is_ok());
    }

    #[test]
    fn privileged_delete_bypasses_ownership() {
        let owner = identity(Role::User);
        let admin = identity(Role::Admin);
        let order = sample_order(owner.user_id);
        let order_id = order.id;
        let svc = OrderService::new(FakeRepo::with_order(order));

        assert!(svc.delete_order(order_id, &admin).is_ok());
    }
}
