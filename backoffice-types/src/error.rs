//! Error types for the back-office service.

use crate::domain::{Money, PostAction, PostStatus};

/// Domain-level errors (business rule and lifecycle violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Validation error: {0}")]
    Validation(String),

    // payment transaction rules
    #[error("Deposit amount cannot exceed {cap} (80% of the amount due)")]
    DepositExceedsCap { cap: Money },

    #[error("A deposit must be the first transaction on a payment")]
    DepositNotFirst,

    #[error("A deposit covering the full amount due must use the PAYMENT kind")]
    DepositCoversFullAmount,

    #[error("A full payment is only allowed when nothing has been paid yet")]
    PaymentNotFirst,

    #[error("A full payment must equal the amount due ({expected})")]
    PaymentAmountMismatch { expected: Money },

    #[error("A final payment requires a prior deposit")]
    FinalWithoutDeposit,

    #[error("Nothing is owed on this payment")]
    NothingOwed,

    #[error("A final payment must equal the remaining balance ({expected})")]
    FinalAmountMismatch { expected: Money },

    #[error("There is nothing to refund on this payment")]
    NothingToRefund,

    #[error("Refund of {requested} exceeds the paid amount {available}")]
    RefundExceedsPaid { available: Money, requested: Money },

    #[error("A pending payment cannot be refunded")]
    RefundOnPendingPayment,

    // post lifecycle
    #[error("Cannot {action} a post while it is {status}")]
    InvalidStateForAction {
        action: PostAction,
        status: PostStatus,
    },

    #[error("Only the post owner may {action} this post")]
    NotPostOwner { action: PostAction },

    #[error("Only an admin may {action} a post")]
    AdminOnly { action: PostAction },

    #[error("This post belongs to another employee")]
    PostAccessDenied,
}

impl DomainError {
    /// True for the errors where the actor lacks the right to act at all,
    /// as opposed to a rule or state violation.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            DomainError::NotPostOwner { .. }
                | DomainError::AdminOnly { .. }
                | DomainError::PostAccessDenied
        )
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes: 400, 404, 403, 409, 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) | DomainError::NegativeAmount => {
                AppError::BadRequest(err.to_string())
            }
            _ if err.is_authorization() => AppError::Forbidden(err.to_string()),
            // every remaining variant is a business-rule or state violation
            _ => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Conflict(e) => AppError::Conflict(e),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
        }
    }
}
