//! # Back-office Client SDK
//!
//! A typed Rust client for the back-office API.

use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use backoffice_types::{
    CreatePaymentMethodRequest, CreatePaymentRequest, CreatePostRequest, CreatePostTypeRequest,
    CreateStaffRequest, CreateTransactionRequest, Payment, PaymentId, PaymentMethod,
    PaymentMethodId, PaymentTransaction, Post, PostId, PostType, Role, StaffCreatedResponse,
    StaffInfo, TransactionId, TransactionKind, UpdatePaymentRequest,
    UpdateTransactionNotesRequest,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Back-office API client.
pub struct BackofficeClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl BackofficeClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staff
    // ─────────────────────────────────────────────────────────────────────────

    /// Bootstraps the first admin account.
    pub async fn bootstrap(&self, name: &str) -> Result<StaffCreatedResponse, ClientError> {
        self.post(
            "/api/bootstrap",
            &serde_json::json!({ "name": name }),
        )
        .await
    }

    /// Creates a staff account (admin only).
    pub async fn create_staff(
        &self,
        name: &str,
        role: Role,
    ) -> Result<StaffCreatedResponse, ClientError> {
        let req = CreateStaffRequest {
            name: name.to_string(),
            role,
        };
        self.post("/api/staff", &req).await
    }

    /// Lists all staff accounts (admin only).
    pub async fn list_staff(&self) -> Result<Vec<StaffInfo>, ClientError> {
        self.get("/api/staff").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a payment for a booking.
    pub async fn create_payment(
        &self,
        booking_id: Uuid,
        amount_due: i64,
        notes: Option<String>,
    ) -> Result<Payment, ClientError> {
        let req = CreatePaymentRequest {
            booking_id,
            amount_due,
            notes,
        };
        self.post("/api/payments", &req).await
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.get(&format!("/api/payments/{}", id)).await
    }

    /// Lists all payments.
    pub async fn list_payments(&self) -> Result<Vec<Payment>, ClientError> {
        self.get("/api/payments").await
    }

    /// Updates the mutable fields of a payment.
    pub async fn update_payment(
        &self,
        id: PaymentId,
        req: UpdatePaymentRequest,
    ) -> Result<Payment, ClientError> {
        self.put(&format!("/api/payments/{}", id), &req).await
    }

    /// Records a transaction against a payment.
    pub async fn record_transaction(
        &self,
        payment_id: PaymentId,
        payment_method_id: PaymentMethodId,
        kind: TransactionKind,
        amount: i64,
        reference: Option<String>,
    ) -> Result<PaymentTransaction, ClientError> {
        let req = CreateTransactionRequest {
            payment_method_id,
            kind,
            amount,
            reference,
            notes: None,
        };
        self.post(&format!("/api/payments/{}/transactions", payment_id), &req)
            .await
    }

    /// Lists the transaction history of a payment.
    pub async fn list_transactions(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<PaymentTransaction>, ClientError> {
        self.get(&format!("/api/payments/{}/transactions", payment_id))
            .await
    }

    /// Amends the reference/notes fields of a recorded transaction.
    pub async fn update_transaction_notes(
        &self,
        id: TransactionId,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Result<PaymentTransaction, ClientError> {
        let req = UpdateTransactionNotesRequest { reference, notes };
        self.put(&format!("/api/transactions/{}/notes", id), &req)
            .await
    }

    /// Registers a payment method (admin only).
    pub async fn create_payment_method(&self, name: &str) -> Result<PaymentMethod, ClientError> {
        let req = CreatePaymentMethodRequest {
            name: name.to_string(),
        };
        self.post("/api/payment-methods", &req).await
    }

    /// Lists all payment methods.
    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, ClientError> {
        self.get("/api/payment-methods").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Posts
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a draft post owned by the caller.
    pub async fn create_post(&self, req: CreatePostRequest) -> Result<Post, ClientError> {
        self.post("/api/posts", &req).await
    }

    /// Gets a post by ID.
    pub async fn get_post(&self, id: PostId) -> Result<Post, ClientError> {
        self.get(&format!("/api/posts/{}", id)).await
    }

    /// Lists posts visible to the caller.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        self.get("/api/posts").await
    }

    /// Applies a named lifecycle action to a post.
    pub async fn post_action(&self, id: PostId, action: &str) -> Result<Post, ClientError> {
        self.post(
            &format!("/api/posts/{}/{}", id, action),
            &serde_json::json!({}),
        )
        .await
    }

    /// Deletes an unpublished post owned by the caller.
    pub async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        let mut req = self.http.delete(format!("{}/api/posts/{}", self.base_url, id));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Registers a post type (admin only).
    pub async fn create_post_type(&self, name: &str) -> Result<PostType, ClientError> {
        let req = CreatePostTypeRequest {
            name: name.to_string(),
        };
        self.post("/api/post-types", &req).await
    }

    /// Lists all post types.
    pub async fn list_post_types(&self) -> Result<Vec<PostType>, ClientError> {
        self.get("/api/post-types").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .put(format!("{}{}", self.base_url, path))
            .json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
