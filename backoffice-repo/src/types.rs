//! Shared database types with feature-gated fields for SQLite and PostgreSQL.

use sqlx::FromRow;

use backoffice_types::{
    Employee, EmployeeId, Money, Payment, PaymentId, PaymentMethod, PaymentMethodId, PaymentStatus,
    PaymentTransaction, Post, PostId, PostStatus, PostType, PostTypeId, RepoError, Role,
    TransactionId, TransactionKind,
};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "sqlite"))]
use chrono::{DateTime, Utc};
#[cfg(not(feature = "sqlite"))]
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(feature = "sqlite")]
pub fn parse_datetime(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(feature = "sqlite")]
pub fn parse_datetime_opt(
    s: Option<String>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, RepoError> {
    s.as_deref().map(parse_datetime).transpose()
}

pub fn parse_payment_status(s: &str) -> Result<PaymentStatus, RepoError> {
    s.parse().map_err(RepoError::Database)
}

pub fn parse_transaction_kind(s: &str) -> Result<TransactionKind, RepoError> {
    s.parse().map_err(RepoError::Database)
}

pub fn parse_post_status(s: &str) -> Result<PostStatus, RepoError> {
    s.parse().map_err(RepoError::Database)
}

pub fn parse_role(s: &str) -> Result<Role, RepoError> {
    s.parse().map_err(RepoError::Database)
}

/// Maps an insert/update failure, turning unique-constraint violations into
/// `RepoError::Conflict` so racing submissions surface as 409s.
pub fn map_write_err(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(e.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    #[cfg(not(feature = "sqlite"))]
    pub booking_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub booking_id: String,

    pub status: String,
    pub amount_due: i64,
    pub amount_paid: i64,

    #[cfg(not(feature = "sqlite"))]
    pub payment_date: Option<DateTime<Utc>>,
    #[cfg(feature = "sqlite")]
    pub payment_date: Option<String>,

    pub notes: Option<String>,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

impl DbPayment {
    /// Convert database row to domain Payment.
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let status = parse_payment_status(&self.status)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, booking_id, payment_date, created_at) = (
            PaymentId::from_uuid(self.id),
            self.booking_id,
            self.payment_date,
            self.created_at,
        );

        #[cfg(feature = "sqlite")]
        let (id, booking_id, payment_date, created_at) = (
            PaymentId::from_uuid(parse_uuid(&self.id)?),
            parse_uuid(&self.booking_id)?,
            parse_datetime_opt(self.payment_date)?,
            parse_datetime(&self.created_at)?,
        );

        Ok(Payment::from_parts(
            id,
            booking_id,
            status,
            Money::from_minor_unchecked(self.amount_due),
            Money::from_minor_unchecked(self.amount_paid),
            payment_date,
            self.notes,
            created_at,
        ))
    }
}

/// Payment transaction row from database.
#[derive(FromRow)]
pub struct DbPaymentTransaction {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub kind: String,
    pub amount: i64,

    #[cfg(not(feature = "sqlite"))]
    pub transaction_date: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub transaction_date: String,

    #[cfg(not(feature = "sqlite"))]
    pub payment_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub payment_id: String,

    #[cfg(not(feature = "sqlite"))]
    pub payment_method_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub payment_method_id: String,

    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl DbPaymentTransaction {
    /// Convert database row to domain PaymentTransaction.
    pub fn into_domain(self) -> Result<PaymentTransaction, RepoError> {
        let kind = parse_transaction_kind(&self.kind)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, transaction_date, payment_id, payment_method_id) = (
            TransactionId::from_uuid(self.id),
            self.transaction_date,
            PaymentId::from_uuid(self.payment_id),
            PaymentMethodId::from_uuid(self.payment_method_id),
        );

        #[cfg(feature = "sqlite")]
        let (id, transaction_date, payment_id, payment_method_id) = (
            TransactionId::from_uuid(parse_uuid(&self.id)?),
            parse_datetime(&self.transaction_date)?,
            PaymentId::from_uuid(parse_uuid(&self.payment_id)?),
            PaymentMethodId::from_uuid(parse_uuid(&self.payment_method_id)?),
        );

        Ok(PaymentTransaction::from_parts(
            id,
            kind,
            Money::from_minor_unchecked(self.amount),
            transaction_date,
            payment_id,
            payment_method_id,
            self.reference,
            self.notes,
        ))
    }
}

/// Post row from database.
#[derive(FromRow)]
pub struct DbPost {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub title: String,
    pub body: String,
    pub slug: String,
    pub status: String,

    #[cfg(not(feature = "sqlite"))]
    pub employee_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub employee_id: String,

    #[cfg(not(feature = "sqlite"))]
    pub post_type_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub post_type_id: String,

    #[cfg(not(feature = "sqlite"))]
    pub publish_date: Option<DateTime<Utc>>,
    #[cfg(feature = "sqlite")]
    pub publish_date: Option<String>,

    pub views: i64,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

impl DbPost {
    /// Convert database row to domain Post.
    pub fn into_domain(self) -> Result<Post, RepoError> {
        let status = parse_post_status(&self.status)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, employee_id, post_type_id, publish_date, created_at) = (
            PostId::from_uuid(self.id),
            EmployeeId::from_uuid(self.employee_id),
            PostTypeId::from_uuid(self.post_type_id),
            self.publish_date,
            self.created_at,
        );

        #[cfg(feature = "sqlite")]
        let (id, employee_id, post_type_id, publish_date, created_at) = (
            PostId::from_uuid(parse_uuid(&self.id)?),
            EmployeeId::from_uuid(parse_uuid(&self.employee_id)?),
            PostTypeId::from_uuid(parse_uuid(&self.post_type_id)?),
            parse_datetime_opt(self.publish_date)?,
            parse_datetime(&self.created_at)?,
        );

        Ok(Post::from_parts(
            id,
            self.title,
            self.body,
            self.slug,
            status,
            employee_id,
            post_type_id,
            publish_date,
            self.views,
            created_at,
        ))
    }
}

/// Row shape shared by the payment_methods and post_types tables.
#[derive(FromRow)]
pub struct DbNamedItem {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub name: String,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

impl DbNamedItem {
    #[cfg(not(feature = "sqlite"))]
    fn parts(self) -> Result<(uuid::Uuid, String, chrono::DateTime<chrono::Utc>), RepoError> {
        Ok((self.id, self.name, self.created_at))
    }

    #[cfg(feature = "sqlite")]
    fn parts(self) -> Result<(uuid::Uuid, String, chrono::DateTime<chrono::Utc>), RepoError> {
        Ok((
            parse_uuid(&self.id)?,
            self.name,
            parse_datetime(&self.created_at)?,
        ))
    }

    /// Convert database row to domain PaymentMethod.
    pub fn into_payment_method(self) -> Result<PaymentMethod, RepoError> {
        let (id, name, created_at) = self.parts()?;
        Ok(PaymentMethod::from_parts(
            PaymentMethodId::from_uuid(id),
            name,
            created_at,
        ))
    }

    /// Convert database row to domain PostType.
    pub fn into_post_type(self) -> Result<PostType, RepoError> {
        let (id, name, created_at) = self.parts()?;
        Ok(PostType::from_parts(
            PostTypeId::from_uuid(id),
            name,
            created_at,
        ))
    }
}

/// Employee row from database.
#[derive(FromRow)]
pub struct DbEmployee {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub name: String,
    pub role: String,
    pub token_hash: String,

    #[cfg(not(feature = "sqlite"))]
    pub is_active: bool,
    #[cfg(feature = "sqlite")]
    pub is_active: i64,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,

    #[cfg(not(feature = "sqlite"))]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[cfg(feature = "sqlite")]
    pub last_seen_at: Option<String>,
}

impl DbEmployee {
    /// Convert database row to domain Employee.
    pub fn into_domain(self) -> Result<Employee, RepoError> {
        let role = parse_role(&self.role)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, is_active, created_at, last_seen_at) = (
            EmployeeId::from_uuid(self.id),
            self.is_active,
            self.created_at,
            self.last_seen_at,
        );

        #[cfg(feature = "sqlite")]
        let (id, is_active, created_at, last_seen_at) = (
            EmployeeId::from_uuid(parse_uuid(&self.id)?),
            self.is_active != 0,
            parse_datetime(&self.created_at)?,
            parse_datetime_opt(self.last_seen_at)?,
        );

        Ok(Employee {
            id,
            name: self.name,
            role,
            token_hash: self.token_hash,
            is_active,
            created_at,
            last_seen_at,
        })
    }
}
