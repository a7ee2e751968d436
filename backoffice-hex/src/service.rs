//! Application services
//!
//! Orchestrate domain rules through the repository port.
//! Contain NO infrastructure logic - pure business orchestration.

use std::sync::Arc;

use chrono::Utc;

use backoffice_types::{
    Actor, AppError, BackofficeRepository, CreatePaymentRequest, CreatePostRequest,
    CreateTransactionRequest, Money, Payment, PaymentId, PaymentTransaction, Post, PostAction,
    PostId, Role, TransactionId, UpdatePaymentRequest, UpdateTransactionNotesRequest,
};

// ─────────────────────────────────────────────────────────────────────────────
// Payment service
// ─────────────────────────────────────────────────────────────────────────────

/// Application service for payments and their transactions.
///
/// Generic over `R: BackofficeRepository` - the adapter is injected at
/// compile time, which keeps the rule code testable against an in-memory
/// repository.
pub struct PaymentService<R: BackofficeRepository> {
    repo: Arc<R>,
}

impl<R: BackofficeRepository> PaymentService<R> {
    /// Creates a new payment service over the shared repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a new pending payment for a booking.
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<Payment, AppError> {
        let amount_due = Money::new(req.amount_due)?;
        let payment = Payment::new(req.booking_id, amount_due, req.notes)?;

        self.repo.create_payment(&payment).await?;
        Ok(payment)
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get_payment(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Payment {}", id))))
    }

    /// Lists all payments.
    pub async fn list_payments(&self) -> Result<Vec<Payment>, AppError> {
        self.repo.list_payments().await.map_err(Into::into)
    }

    /// Updates the mutable fields of a payment (status, amount paid,
    /// payment date, notes). Absent fields are left unchanged.
    pub async fn update_payment(
        &self,
        id: PaymentId,
        req: UpdatePaymentRequest,
    ) -> Result<Payment, AppError> {
        let mut payment = self.get_payment(id).await?;

        if let Some(status) = req.status {
            payment.status = status;
        }
        if let Some(amount_paid) = req.amount_paid {
            payment.amount_paid = Money::new(amount_paid)?;
        }
        if let Some(payment_date) = req.payment_date {
            payment.payment_date = Some(payment_date);
        }
        if let Some(notes) = req.notes {
            payment.notes = Some(notes);
        }

        self.repo.update_payment(&payment).await?;
        Ok(payment)
    }

    /// Validates and records a transaction against a payment.
    ///
    /// The whole operation either succeeds or leaves no trace: the rules run
    /// over the freshly loaded history before anything is written.
    pub async fn record_transaction(
        &self,
        payment_id: PaymentId,
        req: CreateTransactionRequest,
    ) -> Result<PaymentTransaction, AppError> {
        if req.amount <= 0 {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }

        let payment = self.get_payment(payment_id).await?;

        let method = self.repo.get_payment_method(req.payment_method_id).await?;
        if method.is_none() {
            return Err(AppError::NotFound(format!(
                "Payment method {}",
                req.payment_method_id
            )));
        }

        let history = self.repo.list_transactions_for_payment(payment_id).await?;
        let amount = Money::new(req.amount)?;

        payment.validate_transaction(&history, req.kind, amount)?;

        let tx = PaymentTransaction::new(
            payment_id,
            req.payment_method_id,
            req.kind,
            amount,
            req.reference,
            req.notes,
        );
        self.repo.record_transaction(&tx).await?;

        tracing::info!(
            payment_id = %payment_id,
            kind = %tx.kind,
            amount = tx.amount.minor(),
            "transaction recorded"
        );

        Ok(tx)
    }

    /// Lists the transaction history of a payment, oldest first.
    pub async fn list_transactions(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<PaymentTransaction>, AppError> {
        // Verify the payment exists first
        let _ = self.get_payment(payment_id).await?;

        self.repo
            .list_transactions_for_payment(payment_id)
            .await
            .map_err(Into::into)
    }

    /// Amends the reference/notes fields of a recorded transaction.
    pub async fn update_transaction_notes(
        &self,
        id: TransactionId,
        req: UpdateTransactionNotesRequest,
    ) -> Result<PaymentTransaction, AppError> {
        self.repo
            .update_transaction_notes(id, req.reference, req.notes)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Transaction {}", id))))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Post service
// ─────────────────────────────────────────────────────────────────────────────

/// Application service for the post lifecycle.
///
/// Every role- or ownership-gated operation takes the acting staff member
/// explicitly; there is no ambient identity.
pub struct PostService<R: BackofficeRepository> {
    repo: Arc<R>,
}

impl<R: BackofficeRepository> PostService<R> {
    /// Creates a new post service over the shared repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Creates a new draft owned by the acting staff member.
    pub async fn create_post(
        &self,
        actor: &Actor,
        req: CreatePostRequest,
    ) -> Result<Post, AppError> {
        let post_type = self.repo.get_post_type(req.post_type_id).await?;
        if post_type.is_none() {
            return Err(AppError::NotFound(format!(
                "Post type {}",
                req.post_type_id
            )));
        }

        let post = Post::new(
            req.title,
            req.body,
            req.slug,
            actor.employee_id,
            req.post_type_id,
        )?;
        self.repo.create_post(&post).await?;
        Ok(post)
    }

    /// Gets a post by ID. Admins may read any post; employees only their own.
    pub async fn get_post(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        let post = self.load(id).await?;

        if !post.readable_by(actor) {
            return Err(backoffice_types::DomainError::PostAccessDenied.into());
        }

        Ok(post)
    }

    /// Lists posts visible to the actor: all of them for an admin, only
    /// authored ones for an employee.
    pub async fn list_posts(&self, actor: &Actor) -> Result<Vec<Post>, AppError> {
        let posts = match actor.role {
            Role::Admin => self.repo.list_posts().await?,
            Role::Employee => self.repo.list_posts_by_author(actor.employee_id).await?,
        };

        Ok(posts)
    }

    /// Applies a lifecycle action and persists the resulting status.
    pub async fn apply_action(
        &self,
        actor: &Actor,
        id: PostId,
        action: PostAction,
    ) -> Result<Post, AppError> {
        let mut post = self.load(id).await?;

        let next = post.apply(action, actor)?;
        let publish_date = (action == PostAction::Approve).then(Utc::now);

        self.repo.set_post_status(id, next, publish_date).await?;

        tracing::info!(post_id = %id, action = %action, status = %next, "post transitioned");

        post.status = next;
        if let Some(date) = publish_date {
            post.publish_date = Some(date);
        }
        Ok(post)
    }

    /// Owner submits a draft for review.
    pub async fn submit(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        self.apply_action(actor, id, PostAction::Submit).await
    }

    /// Admin approves a pending post, publishing it.
    pub async fn approve(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        self.apply_action(actor, id, PostAction::Approve).await
    }

    /// Admin rejects a pending post back to unpublished.
    pub async fn reject(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        self.apply_action(actor, id, PostAction::Reject).await
    }

    /// Admin takes a published post down.
    pub async fn unpublish(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        self.apply_action(actor, id, PostAction::Unpublish).await
    }

    /// Admin restores an unpublished post.
    pub async fn restore(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        self.apply_action(actor, id, PostAction::Restore).await
    }

    /// Owner deletes an unpublished post. The status becomes terminal.
    pub async fn delete(&self, actor: &Actor, id: PostId) -> Result<Post, AppError> {
        self.apply_action(actor, id, PostAction::Delete).await
    }

    async fn load(&self, id: PostId) -> Result<Post, AppError> {
        self.repo
            .get_post(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Post {}", id))))
    }
}
