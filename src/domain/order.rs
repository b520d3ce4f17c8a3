use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Fulfillment state machine: Pending → Processing → Delivered, with
/// Cancelled reachable from any non-terminal state. Delivered and Cancelled
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Processing => "Processing",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(DeliveryStatus::Pending),
            "Processing" => Some(DeliveryStatus::Processing),
            "Delivered" => Some(DeliveryStatus::Delivered),
            "Cancelled" => Some(DeliveryStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    /// Whether `self → next` is a legal transition. Staying in place is
    /// always allowed so partial updates that echo the current value are
    /// not rejected.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        if self == next {
            return true;
        }
        match (self, next) {
            (DeliveryStatus::Pending, DeliveryStatus::Processing) => true,
            (DeliveryStatus::Processing, DeliveryStatus::Delivered) => true,
            (from, DeliveryStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unpaid → Paid only; no transition back to Unpaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Paid" => Some(PaymentStatus::Paid),
            "Unpaid" => Some(PaymentStatus::Unpaid),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        self == next || (self == PaymentStatus::Unpaid && next == PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    PayPal,
    Gcash,
    Cod,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Gcash => "GCash",
            PaymentMethod::Cod => "COD",
        }
    }

    /// Normalize a client-supplied payment method string, case-insensitively.
    /// Unknown values fall back to COD.
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "paypal" => PaymentMethod::PayPal,
            "gcash" => PaymentMethod::Gcash,
            _ => PaymentMethod::Cod,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PayPal" => Some(PaymentMethod::PayPal),
            "GCash" => Some(PaymentMethod::Gcash),
            "COD" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }

    /// COD orders start Unpaid; anything prepaid starts Paid.
    pub fn initial_payment_status(self) -> PaymentStatus {
        match self {
            PaymentMethod::Cod => PaymentStatus::Unpaid,
            _ => PaymentStatus::Paid,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order intent: the product reference plus the price the
/// customer saw. Name and the stored price are snapshotted at write time.
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderItemInput {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// A fully validated create request, ready for the repository.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub items: Vec<OrderItemInput>,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub payment_method: PaymentMethod,
    pub address: String,
}

/// Partial update. `None` means "leave unchanged"; a present value is always
/// applied, so falsy-but-legitimate updates (e.g. a zero delivery fee) are
/// honoured.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub items: Option<Vec<OrderItemInput>>,
    pub subtotal: Option<BigDecimal>,
    pub delivery_fee: Option<BigDecimal>,
    pub total: Option<BigDecimal>,
    pub delivery_status: Option<DeliveryStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub address: Option<String>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self.items.is_none()
            && self.subtotal.is_none()
            && self.delivery_fee.is_none()
            && self.total.is_none()
            && self.delivery_status.is_none()
            && self.payment_status.is_none()
            && self.address.is_none()
    }
}

/// Status-only update used by the privileged back-office endpoint.
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
    pub delivery_status: Option<DeliveryStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
    /// Display-only enrichment from the live catalog; never part of the
    /// historical snapshot.
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub delivery_status: DeliveryStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_payment_method_normalizes_to_cod() {
        assert_eq!(PaymentMethod::normalize("bitcoin"), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::normalize(""), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::normalize("cod"), PaymentMethod::Cod);
    }

    #[test]
    fn known_payment_methods_normalize_case_insensitively() {
        assert_eq!(PaymentMethod::normalize("PayPal"), PaymentMethod::PayPal);
        assert_eq!(PaymentMethod::normalize("paypal"), PaymentMethod::PayPal);
        assert_eq!(PaymentMethod::normalize(" GCASH "), PaymentMethod::Gcash);
    }

    #[test]
    fn cod_starts_unpaid_others_paid() {
        assert_eq!(
            PaymentMethod::Cod.initial_payment_status(),
            PaymentStatus::Unpaid
        );
        assert_eq!(
            PaymentMethod::PayPal.initial_payment_status(),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentMethod::Gcash.initial_payment_status(),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn delivery_status_forward_transitions() {
        use DeliveryStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Pending));
    }

    #[test]
    fn cancellation_reachable_from_non_terminal_only() {
        use DeliveryStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn same_status_is_a_noop_transition() {
        use DeliveryStatus::*;
        for s in [Pending, Processing, Delivered, Cancelled] {
            assert!(s.can_transition_to(s));
        }
    }

    #[test]
    fn payment_status_is_one_directional() {
        assert!(PaymentStatus::Unpaid.can_transition_to(PaymentStatus::Paid));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Unpaid));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn status_strings_roundtrip() {
        for s in [
            DeliveryStatus::Pending,
            DeliveryStatus::Processing,
            DeliveryStatus::Delivered,
            DeliveryStatus::Cancelled,
        ] {
            assert_eq!(DeliveryStatus::parse(s.as_str()), Some(s));
        }
        for s in [PaymentStatus::Paid, PaymentStatus::Unpaid] {
            assert_eq!(PaymentStatus::parse(s.as_str()), Some(s));
        }
        for m in [
            PaymentMethod::PayPal,
            PaymentMethod::Gcash,
            PaymentMethod::Cod,
        ] {
            assert_eq!(PaymentMethod::parse(m.as_str()), Some(m));
        }
    }

    #[test]
    fn line_total_is_quantity_times_price() {
        let item = OrderItemInput {
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: BigDecimal::from(50),
        };
        assert_eq!(item.line_total(), BigDecimal::from(150));
    }
}
