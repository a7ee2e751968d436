//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite) implement this trait.

use chrono::{DateTime, Utc};

use crate::domain::{
    Employee, EmployeeId, Payment, PaymentId, PaymentMethod, PaymentMethodId, PaymentTransaction,
    Post, PostId, PostStatus, PostType, PostTypeId, Role, TransactionId,
};
use crate::error::RepoError;

/// The main repository port for the back-office store.
///
/// Business rules run in the service layer over data loaded through this
/// port; each mutating operation here commits atomically. Uniqueness of
/// (payment, method, transaction date) is enforced by the store and surfaces
/// as `RepoError::Conflict`.
#[async_trait::async_trait]
pub trait BackofficeRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    /// Persists a new payment.
    async fn create_payment(&self, payment: &Payment) -> Result<(), RepoError>;

    /// Gets a payment by ID.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists all payments, newest first.
    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError>;

    /// Persists the mutable fields of a payment.
    async fn update_payment(&self, payment: &Payment) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Payment transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Persists an already-validated transaction.
    async fn record_transaction(&self, tx: &PaymentTransaction) -> Result<(), RepoError>;

    /// Lists the full transaction history of a payment, oldest first.
    async fn list_transactions_for_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<PaymentTransaction>, RepoError>;

    /// Amends the reference/notes fields of a transaction; returns the
    /// updated row, or None when the transaction does not exist.
    async fn update_transaction_notes(
        &self,
        id: TransactionId,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Result<Option<PaymentTransaction>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Posts
    // ─────────────────────────────────────────────────────────────────────────

    /// Persists a new draft post.
    async fn create_post(&self, post: &Post) -> Result<(), RepoError>;

    /// Gets a post by ID.
    async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// Lists all posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError>;

    /// Lists the posts authored by one employee, newest first.
    async fn list_posts_by_author(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Post>, RepoError>;

    /// Moves a post to a new lifecycle status, optionally stamping the
    /// publish date.
    async fn set_post_status(
        &self,
        id: PostId,
        status: PostStatus,
        publish_date: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reference data
    // ─────────────────────────────────────────────────────────────────────────

    /// Persists a new payment method.
    async fn create_payment_method(&self, method: &PaymentMethod) -> Result<(), RepoError>;

    /// Gets a payment method by ID.
    async fn get_payment_method(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepoError>;

    /// Lists all payment methods.
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepoError>;

    /// Persists a new post type.
    async fn create_post_type(&self, post_type: &PostType) -> Result<(), RepoError>;

    /// Gets a post type by ID.
    async fn get_post_type(&self, id: PostTypeId) -> Result<Option<PostType>, RepoError>;

    /// Lists all post types.
    async fn list_post_types(&self) -> Result<Vec<PostType>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Staff & authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a staff account and returns it together with the raw bearer
    /// token (returned exactly once; only its hash is stored).
    async fn create_employee(&self, name: &str, role: Role)
    -> Result<(Employee, String), RepoError>;

    /// Resolves an active employee from a token hash, updating last-seen.
    async fn verify_token_hash(&self, token_hash: &str) -> Result<Option<Employee>, RepoError>;

    /// Counts all staff accounts, active or not.
    async fn count_employees(&self) -> Result<i64, RepoError>;

    /// Lists all staff accounts.
    async fn list_employees(&self) -> Result<Vec<Employee>, RepoError>;

    /// Deactivates a staff account; returns false when it does not exist.
    async fn deactivate_employee(&self, id: EmployeeId) -> Result<bool, RepoError>;
}
