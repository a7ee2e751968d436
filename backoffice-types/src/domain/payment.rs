//! Payment aggregate and payment-method reference data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::Money;
use crate::error::DomainError;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Settlement state of a payment.
///
/// The state is maintained by back-office staff through payment updates;
/// recording a transaction never advances it on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Refund,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Complete => write!(f, "COMPLETE"),
            PaymentStatus::Refund => write!(f, "REFUND"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETE" => Ok(PaymentStatus::Complete),
            "REFUND" => Ok(PaymentStatus::Refund),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// A payment owed against a booking.
///
/// Owns a history of [`super::PaymentTransaction`] records (cascade delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// The booking this payment settles (opaque reference into the booking system)
    pub booking_id: Uuid,
    pub status: PaymentStatus,
    /// Total amount owed
    pub amount_due: Money,
    /// Amount recorded as paid by staff; not derived from the transaction history
    pub amount_paid: Money,
    /// When the payment was settled, if it has been
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// When the payment record was created
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment.
    ///
    /// # Validation
    /// - `amount_due` must be strictly positive
    pub fn new(booking_id: Uuid, amount_due: Money, notes: Option<String>) -> Result<Self, DomainError> {
        if amount_due.is_zero() {
            return Err(DomainError::Validation(
                "Amount due must be positive".into(),
            ));
        }

        Ok(Self {
            id: PaymentId::new(),
            booking_id,
            status: PaymentStatus::Pending,
            amount_due,
            amount_paid: Money::zero(),
            payment_date: None,
            notes,
            created_at: Utc::now(),
        })
    }

    /// Reconstructs a payment from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        booking_id: Uuid,
        status: PaymentStatus,
        amount_due: Money,
        amount_paid: Money,
        payment_date: Option<DateTime<Utc>>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            booking_id,
            status,
            amount_due,
            amount_paid,
            payment_date,
            notes,
            created_at,
        }
    }
}

/// Unique identifier for a PaymentMethod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentMethodId(Uuid);

impl PaymentMethodId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentMethodId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentMethodId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How a transaction was settled (cash, card, bank transfer, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Creates a new payment method.
    pub fn new(name: String) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Payment method name cannot be empty".into(),
            ));
        }

        Ok(Self {
            id: PaymentMethodId::new(),
            name,
            created_at: Utc::now(),
        })
    }

    /// Reconstructs a payment method from database fields.
    pub fn from_parts(id: PaymentMethodId, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }
}
