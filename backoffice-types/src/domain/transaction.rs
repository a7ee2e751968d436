//! Payment transactions and the rules that gate their creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use super::payment::{Payment, PaymentId, PaymentMethodId, PaymentStatus};
use crate::error::DomainError;

/// Unique identifier for a PaymentTransaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The business meaning of a transaction against a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Partial up-front payment; must be the first transaction
    Deposit,
    /// The full amount due in one transaction
    Payment,
    /// The balance remaining after a deposit
    Final,
    /// Money returned to the customer
    Refund,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Payment => write!(f, "PAYMENT"),
            TransactionKind::Final => write!(f, "FINAL"),
            TransactionKind::Refund => write!(f, "REFUND"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "PAYMENT" => Ok(TransactionKind::Payment),
            "FINAL" => Ok(TransactionKind::Final),
            "REFUND" => Ok(TransactionKind::Refund),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

/// A recorded money movement against a payment.
///
/// Transactions are immutable once created, except for the free-text
/// reference and notes fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Unique identifier
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Amount moved (always positive; direction comes from the kind)
    pub amount: Money,
    /// Stamped when the transaction was accepted
    pub transaction_date: DateTime<Utc>,
    pub payment_id: PaymentId,
    pub payment_method_id: PaymentMethodId,
    /// External reference (e.g. a card-terminal slip number)
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl PaymentTransaction {
    /// Creates a new transaction stamped with the current time.
    pub fn new(
        payment_id: PaymentId,
        payment_method_id: PaymentMethodId,
        kind: TransactionKind,
        amount: Money,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            transaction_date: Utc::now(),
            payment_id,
            payment_method_id,
            reference,
            notes,
        }
    }

    /// Reconstructs a transaction from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TransactionId,
        kind: TransactionKind,
        amount: Money,
        transaction_date: DateTime<Utc>,
        payment_id: PaymentId,
        payment_method_id: PaymentMethodId,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            kind,
            amount,
            transaction_date,
            payment_id,
            payment_method_id,
            reference,
            notes,
        }
    }
}

/// Net amount paid so far: non-refund amounts minus refund amounts,
/// in minor units.
pub fn net_paid(history: &[PaymentTransaction]) -> i64 {
    history.iter().fold(0i64, |acc, tx| match tx.kind {
        TransactionKind::Refund => acc - tx.amount.minor(),
        _ => acc + tx.amount.minor(),
    })
}

impl Payment {
    /// Decides whether a proposed transaction may be recorded against this
    /// payment, given its full existing history.
    ///
    /// The caller has already established `amount > 0`. Nothing is mutated;
    /// on `Ok(())` the caller stamps and persists the transaction.
    pub fn validate_transaction(
        &self,
        history: &[PaymentTransaction],
        kind: TransactionKind,
        amount: Money,
    ) -> Result<(), DomainError> {
        let net = net_paid(history);
        let due = self.amount_due.minor();

        match kind {
            TransactionKind::Deposit => {
                // cap = 80% of amount due, compared exactly in integers
                if amount.minor() * 10 > due * 8 {
                    return Err(DomainError::DepositExceedsCap {
                        cap: Money::from_minor_unchecked(due * 8 / 10),
                    });
                }
                if net > 0 {
                    return Err(DomainError::DepositNotFirst);
                }
                if amount.minor() >= due {
                    return Err(DomainError::DepositCoversFullAmount);
                }
            }
            TransactionKind::Payment => {
                if net > 0 {
                    return Err(DomainError::PaymentNotFirst);
                }
                if amount.minor() != due {
                    return Err(DomainError::PaymentAmountMismatch {
                        expected: self.amount_due,
                    });
                }
            }
            TransactionKind::Final => {
                if net <= 0 {
                    return Err(DomainError::FinalWithoutDeposit);
                }
                let remaining = due - net;
                if remaining <= 0 {
                    return Err(DomainError::NothingOwed);
                }
                if amount.minor() != remaining {
                    return Err(DomainError::FinalAmountMismatch {
                        expected: Money::from_minor_unchecked(remaining),
                    });
                }
            }
            TransactionKind::Refund => {
                if net <= 0 {
                    return Err(DomainError::NothingToRefund);
                }
                if amount.minor() > net {
                    return Err(DomainError::RefundExceedsPaid {
                        available: Money::from_minor_unchecked(net),
                        requested: amount,
                    });
                }
                if self.status == PaymentStatus::Pending {
                    return Err(DomainError::RefundOnPendingPayment);
                }
            }
        }

        Ok(())
    }
}
