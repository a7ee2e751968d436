//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    EmployeeId, PaymentMethodId, PaymentStatus, PostTypeId, Role, TransactionKind,
};

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new payment for a booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// The booking this payment settles
    pub booking_id: Uuid,
    /// Amount owed, in minor currency units (cents)
    #[schema(example = 10000)]
    pub amount_due: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request to update the mutable fields of a payment.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Amount recorded as paid, in minor units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request to record a transaction against a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub payment_method_id: PaymentMethodId,
    pub kind: TransactionKind,
    /// Amount in minor currency units; must be positive
    #[schema(example = 6000)]
    pub amount: i64,
    /// External reference (e.g. a card-terminal slip number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request to amend the free-text fields of a recorded transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTransactionNotesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request to register a payment method.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentMethodRequest {
    #[schema(example = "Visa terminal")]
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Post DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new draft post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    #[schema(example = "Petra day trip")]
    pub title: String,
    pub body: String,
    /// URL slug, unique across posts
    #[schema(example = "petra-day-trip")]
    pub slug: String,
    pub post_type_id: PostTypeId,
}

/// Request to register a post type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostTypeRequest {
    #[schema(example = "Travel guide")]
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Staff DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to bootstrap the first admin account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BootstrapRequest {
    /// Display name for the first admin
    #[schema(example = "Back-office admin")]
    pub name: String,
}

/// Request to create a staff account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffRequest {
    #[schema(example = "Rania")]
    pub name: String,
    pub role: Role,
}

/// Response after creating a staff account.
///
/// Carries the raw bearer token; it is shown exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffCreatedResponse {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
    /// The bearer token (shown only once)
    pub token: String,
    /// Informational message
    pub message: String,
}

/// Staff listing entry (never exposes the token hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffInfo {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    /// When the account was created (ISO 8601)
    #[schema(value_type = String, example = "2026-01-01T00:00:00Z")]
    pub created_at: String,
    /// When the account last authenticated (ISO 8601)
    #[schema(value_type = Option<String>)]
    pub last_seen_at: Option<String>,
}
