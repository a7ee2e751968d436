//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

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
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl BackofficeRepository for PostgresRepo {
    async fn create_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, booking_id, status, amount_due, amount_paid, payment_date, notes, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.booking_id)
        .bind(payment.status.to_string())
        .bind(payment.amount_due.minor())
        .bind(payment.amount_paid.minor())
        .bind(payment.payment_date)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, booking_id, status, amount_due, amount_paid, payment_date, notes, created_at
               FROM payments WHERE id = $1"#,
        )
        .bind(id.as_uuid())
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
            r#"UPDATE payments SET status = $1, amount_paid = $2, payment_date = $3, notes = $4 WHERE id = $5"#,
        )
        .bind(payment.status.to_string())
        .bind(payment.amount_paid.minor())
        .bind(payment.payment_date)
        .bind(&payment.notes)
        .bind(payment.id.as_uuid())
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
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(tx.id.as_uuid())
        .bind(tx.payment_id.as_uuid())
        .bind(tx.payment_method_id.as_uuid())
        .bind(tx.kind.to_string())
        .bind(tx.amount.minor())
        .bind(tx.transaction_date)
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
               FROM payment_transactions WHERE payment_id = $1
               ORDER BY transaction_date ASC"#,
        )
        .bind(payment_id.as_uuid())
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
        sqlx::query(
            r#"UPDATE payment_transactions
               SET reference = COALESCE($1, reference), notes = COALESCE($2, notes)
               WHERE id = $3"#,
        )
        .bind(reference)
        .bind(notes)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let row: Option<DbPaymentTransaction> = sqlx::query_as(
            r#"SELECT id, kind, amount, transaction_date, payment_id, payment_method_id, reference, notes
               FROM payment_transactions WHERE id = $1"#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPaymentTransaction::into_domain).transpose()
    }

    async fn create_post(&self, post: &Post) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO posts (id, title, body, slug, status, employee_id, post_type_id, publish_date, views, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.slug)
        .bind(post.status.to_string())
        .bind(post.employee_id.as_uuid())
        .bind(post.post_type_id.as_uuid())
        .bind(post.publish_date)
        .bind(post.views)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let row: Option<DbPost> = sqlx::query_as(
            r#"SELECT id, title, body, slug, status, employee_id, post_type_id, publish_date, views, created_at
               FROM posts WHERE id = $1"#,
        )
        .bind(id.as_uuid())
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
               FROM posts WHERE employee_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(employee_id.as_uuid())
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
            r#"UPDATE posts SET status = $1, publish_date = COALESCE($2, publish_date) WHERE id = $3"#,
        )
        .bind(status.to_string())
        .bind(publish_date)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn create_payment_method(&self, method: &PaymentMethod) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT INTO payment_methods (id, name, created_at) VALUES ($1, $2, $3)"#)
            .bind(method.id.as_uuid())
            .bind(&method.name)
            .bind(method.created_at)
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
            sqlx::query_as(r#"SELECT id, name, created_at FROM payment_methods WHERE id = $1"#)
                .bind(id.as_uuid())
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
        sqlx::query(r#"INSERT INTO post_types (id, name, created_at) VALUES ($1, $2, $3)"#)
            .bind(post_type.id.as_uuid())
            .bind(&post_type.name)
            .bind(post_type.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;

        Ok(())
    }

    async fn get_post_type(&self, id: PostTypeId) -> Result<Option<PostType>, RepoError> {
        let row: Option<DbNamedItem> =
            sqlx::query_as(r#"SELECT id, name, created_at FROM post_types WHERE id = $1"#)
                .bind(id.as_uuid())
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
               VALUES ($1, $2, $3, $4, TRUE, $5, NULL)"#,
        )
        .bind(employee.id.as_uuid())
        .bind(&employee.name)
        .bind(employee.role.to_string())
        .bind(&employee.token_hash)
        .bind(employee.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok((employee, raw_token))
    }

    async fn verify_token_hash(&self, token_hash: &str) -> Result<Option<Employee>, RepoError> {
        let row: Option<DbEmployee> = sqlx::query_as(
            r#"SELECT id, name, role, token_hash, is_active, created_at, last_seen_at
               FROM employees WHERE token_hash = $1 AND is_active = TRUE"#,
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

        sqlx::query(r#"UPDATE employees SET last_seen_at = $1 WHERE id = $2"#)
            .bind(now)
            .bind(employee.id.as_uuid())
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
        let result = sqlx::query(r#"UPDATE employees SET is_active = FALSE WHERE id = $1"#)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
