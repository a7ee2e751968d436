//! SQLite repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use backoffice_types::{
    BackofficeRepository, Employee, EmployeeId, Payment, PaymentId, PaymentMethod,
    PaymentMethodId, PaymentTransaction, Post, PostId, PostStatus, PostType, PostTypeId,
    RepoError, Role, TransactionId,
};

use crate::security;
use crate::types::{
    DbEmployee, DbNamedItem, DbPayment, DbPaymentTransaction, DbPost, map_write_err,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        // Run migration from migration file
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl BackofficeRepository for SqliteRepo {
    async fn create_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, booking_id, status, amount_due, amount_paid, payment_date, notes, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.booking_id.to_string())
        .bind(payment.status.to_string())
        .bind(payment.amount_due.minor())
        .bind(payment.amount_paid.minor())
        .bind(payment.payment_date.map(|dt| dt.to_rfc3339()))
        .bind(&payment.notes)
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, booking_id, status, amount_due, amount_paid, payment_date, notes, created_at
               FROM payments WHERE id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, booking_id, status, amount_due, amount_paid, payment_date, notes, created_at
               FROM payments ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }

    async fn update_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE payments SET status = ?, amount_paid = ?, payment_date = ?, notes = ? WHERE id = ?"#,
        )
        .bind(payment.status.to_string())
        .bind(payment.amount_paid.minor())
        .bind(payment.payment_date.map(|dt| dt.to_rfc3339()))
        .bind(&payment.notes)
        .bind(payment.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn record_transaction(&self, tx: &PaymentTransaction) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payment_transactions (id, payment_id, payment_method_id, kind, amount, transaction_date, reference, notes)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tx.id.to_string())
        .bind(tx.payment_id.to_string())
        .bind(tx.payment_method_id.to_string())
        .bind(tx.kind.to_string())
        .bind(tx.amount.minor())
        .bind(tx.transaction_date.to_rfc3339())
        .bind(&tx.reference)
        .bind(&tx.notes)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(())
    }

    async fn list_transactions_for_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<PaymentTransaction>, RepoError> {
        let rows: Vec<DbPaymentTransaction> = sqlx::query_as(
            r#"SELECT id, kind, amount, transaction_date, payment_id, payment_method_id, reference, notes
               FROM payment_transactions WHERE payment_id = ?
               ORDER BY transaction_date ASC"#,
        )
        .bind(payment_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(DbPaymentTransaction::into_domain)
            .collect()
    }

    async fn update_transaction_notes(
        &self,
        id: TransactionId,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Result<Option<PaymentTransaction>, RepoError> {
        let id_str = id.to_string();

        sqlx::query(
            r#"UPDATE payment_transactions
               SET reference = COALESCE(?, reference), notes = COALESCE(?, notes)
               WHERE id = ?"#,
        )
        .bind(reference)
        .bind(notes)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let row: Option<DbPaymentTransaction> = sqlx::query_as(
            r#"SELECT id, kind, amount, transaction_date, payment_id, payment_method_id, reference, notes
               FROM payment_transactions WHERE id = ?"#,
        )
        .bind(&id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPaymentTransaction::into_domain).transpose()
    }

    async fn create_post(&self, post: &Post) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO posts (id, title, body, slug, status, employee_id, post_type_id, publish_date, views, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(post.id.to_string())
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.slug)
        .bind(post.status.to_string())
        .bind(post.employee_id.to_string())
        .bind(post.post_type_id.to_string())
        .bind(post.publish_date.map(|dt| dt.to_rfc3339()))
        .bind(post.views)
        .bind(post.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let row: Option<DbPost> = sqlx::query_as(
            r#"SELECT id, title, body, slug, status, employee_id, post_type_id, publish_date, views, created_at
               FROM posts WHERE id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPost::into_domain).transpose()
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        let rows: Vec<DbPost> = sqlx::query_as(
            r#"SELECT id, title, body, slug, status, employee_id, post_type_id, publish_date, views, created_at
               FROM posts ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPost::into_domain).collect()
    }

    async fn list_posts_by_author(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Post>, RepoError> {
        let rows: Vec<DbPost> = sqlx::query_as(
            r#"SELECT id, title, body, slug, status, employee_id, post_type_id, publish_date, views, created_at
               FROM posts WHERE employee_id = ? ORDER BY created_at DESC"#,
        )
        .bind(employee_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPost::into_domain).collect()
    }

    async fn set_post_status(
        &self,
        id: PostId,
        status: PostStatus,
        publish_date: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE posts SET status = ?, publish_date = COALESCE(?, publish_date) WHERE id = ?"#,
        )
        .bind(status.to_string())
        .bind(publish_date.map(|dt| dt.to_rfc3339()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn create_payment_method(&self, method: &PaymentMethod) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT INTO payment_methods (id, name, created_at) VALUES (?, ?, ?)"#)
            .bind(method.id.to_string())
            .bind(&method.name)
            .bind(method.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_payment_method(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepoError> {
        let row: Option<DbNamedItem> =
            sqlx::query_as(r#"SELECT id, name, created_at FROM payment_methods WHERE id = ?"#)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbNamedItem::into_payment_method).transpose()
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepoError> {
        let rows: Vec<DbNamedItem> =
            sqlx::query_as(r#"SELECT id, name, created_at FROM payment_methods ORDER BY name ASC"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(DbNamedItem::into_payment_method)
            .collect()
    }

    async fn create_post_type(&self, post_type: &PostType) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT INTO post_types (id, name, created_at) VALUES (?, ?, ?)"#)
            .bind(post_type.id.to_string())
            .bind(&post_type.name)
            .bind(post_type.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_post_type(&self, id: PostTypeId) -> Result<Option<PostType>, RepoError> {
        let row: Option<DbNamedItem> =
            sqlx::query_as(r#"SELECT id, name, created_at FROM post_types WHERE id = ?"#)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbNamedItem::into_post_type).transpose()
    }

    async fn list_post_types(&self) -> Result<Vec<PostType>, RepoError> {
        let rows: Vec<DbNamedItem> =
            sqlx::query_as(r#"SELECT id, name, created_at FROM post_types ORDER BY name ASC"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbNamedItem::into_post_type).collect()
    }

    async fn create_employee(
        &self,
        name: &str,
        role: Role,
    ) -> Result<(Employee, String), RepoError> {
        let raw_token = security::generate_token();
        let employee = Employee::new(name.to_string(), role, security::hash_token(&raw_token));

        sqlx::query(
            r#"INSERT INTO employees (id, name, role, token_hash, is_active, created_at, last_seen_at)
               VALUES (?, ?, ?, ?, 1, ?, NULL)"#,
        )
        .bind(employee.id.to_string())
        .bind(&employee.name)
        .bind(employee.role.to_string())
        .bind(&employee.token_hash)
        .bind(employee.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok((employee, raw_token))
    }

    async fn verify_token_hash(&self, token_hash: &str) -> Result<Option<Employee>, RepoError> {
        let row: Option<DbEmployee> = sqlx::query_as(
            r#"SELECT id, name, role, token_hash, is_active, created_at, last_seen_at
               FROM employees WHERE token_hash = ? AND is_active = 1"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut employee = row.into_domain()?;
        let now = chrono::Utc::now();

        sqlx::query(r#"UPDATE employees SET last_seen_at = ? WHERE id = ?"#)
            .bind(now.to_rfc3339())
            .bind(employee.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        employee.last_seen_at = Some(now);
        Ok(Some(employee))
    }

    async fn count_employees(&self) -> Result<i64, RepoError> {
        let count: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM employees"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(count.0)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, RepoError> {
        let rows: Vec<DbEmployee> = sqlx::query_as(
            r#"SELECT id, name, role, token_hash, is_active, created_at, last_seen_at
               FROM employees ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbEmployee::into_domain).collect()
    }

    async fn deactivate_employee(&self, id: EmployeeId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"UPDATE employees SET is_active = 0 WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
