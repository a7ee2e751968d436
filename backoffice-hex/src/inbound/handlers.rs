//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use backoffice_types::{
    Actor, AppError, BackofficeRepository, BootstrapRequest, CreatePaymentMethodRequest,
    CreatePaymentRequest, CreatePostRequest, CreatePostTypeRequest, CreateStaffRequest,
    CreateTransactionRequest, EmployeeId, PaymentId, PaymentMethod, PostId, PostType, Role,
    StaffCreatedResponse, StaffInfo, TransactionId, UpdatePaymentRequest,
    UpdateTransactionNotesRequest,
};

use crate::{PaymentService, PostService};

/// Application state shared across handlers.
pub struct AppState<R: BackofficeRepository> {
    pub repo: Arc<R>,
    pub payments: PaymentService<R>,
    pub posts: PostService<R>,
}

impl<R: BackofficeRepository> AppState<R> {
    /// Wires both services over one shared repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            payments: PaymentService::new(repo.clone()),
            posts: PostService::new(repo.clone()),
            repo,
        }
    }
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn require_admin(actor: &Actor) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".into()).into())
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootstrap & staff
// ─────────────────────────────────────────────────────────────────────────────

/// Bootstrap endpoint - creates the first admin account.
///
/// This endpoint only works while there are NO staff accounts in the system.
/// It returns the raw bearer token (only shown once).
#[tracing::instrument(skip(state), fields(name = %req.name))]
pub async fn bootstrap<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<BootstrapRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let staff_count = state
        .repo
        .count_employees()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if staff_count > 0 {
        return Err(AppError::BadRequest(
            "Bootstrap not allowed: staff accounts already exist. Ask an admin to create new ones.".into(),
        )
        .into());
    }

    let (employee, token) = state
        .repo
        .create_employee(&req.name, Role::Admin)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(StaffCreatedResponse {
            id: employee.id,
            name: employee.name,
            role: employee.role,
            token,
            message: "First admin created. Save this token securely - it won't be shown again!"
                .into(),
        }),
    ))
}

/// Create a staff account (admin only).
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create_staff<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;

    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Staff name cannot be empty".into()).into());
    }

    let (employee, token) = state
        .repo
        .create_employee(&req.name, req.role)
        .await
        .map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(StaffCreatedResponse {
            id: employee.id,
            name: employee.name,
            role: employee.role,
            token,
            message: "Staff account created. Save this token securely - it won't be shown again!"
                .into(),
        }),
    ))
}

/// List all staff accounts (admin only, never exposes token hashes).
#[tracing::instrument(skip(state))]
pub async fn list_staff<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;

    let employees = state
        .repo
        .list_employees()
        .await
        .map_err(AppError::from)?;

    let response: Vec<StaffInfo> = employees
        .into_iter()
        .map(|e| StaffInfo {
            id: e.id,
            name: e.name,
            role: e.role,
            is_active: e.is_active,
            created_at: e.created_at.to_rfc3339(),
            last_seen_at: e.last_seen_at.map(|dt| dt.to_rfc3339()),
        })
        .collect();

    Ok(Json(response))
}

/// Deactivate a staff account (admin only).
#[tracing::instrument(skip(state), fields(staff_id = %id))]
pub async fn deactivate_staff<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;

    let employee_id: EmployeeId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid staff ID".into()))?;

    let deactivated = state
        .repo
        .deactivate_employee(employee_id)
        .await
        .map_err(AppError::from)?;

    if deactivated {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(AppError::NotFound("Staff account not found".into()).into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Create a payment for a booking.
#[tracing::instrument(skip(state, req), fields(booking_id = %req.booking_id, amount_due = req.amount_due))]
pub async fn create_payment<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.payments.create_payment(req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// List all payments.
#[tracing::instrument(skip(state))]
pub async fn list_payments<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.payments.list_payments().await?;
    Ok(Json(payments))
}

/// Get payment by ID.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()))?;

    let payment = state.payments.get_payment(payment_id).await?;
    Ok(Json(payment))
}

/// Update the mutable fields of a payment.
#[tracing::instrument(skip(state, req), fields(payment_id = %id))]
pub async fn update_payment<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()))?;

    let payment = state.payments.update_payment(payment_id, req).await?;
    Ok(Json(payment))
}

/// Record a transaction against a payment.
#[tracing::instrument(skip(state, req), fields(payment_id = %id, kind = %req.kind, amount = req.amount))]
pub async fn record_transaction<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()))?;

    let tx = state.payments.record_transaction(payment_id, req).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// List the transaction history of a payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn list_transactions<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()))?;

    let transactions = state.payments.list_transactions(payment_id).await?;
    Ok(Json(transactions))
}

/// Amend the reference/notes fields of a recorded transaction.
#[tracing::instrument(skip(state, req), fields(transaction_id = %id))]
pub async fn update_transaction_notes<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTransactionNotesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tx_id: TransactionId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid transaction ID".into()))?;

    let tx = state.payments.update_transaction_notes(tx_id, req).await?;
    Ok(Json(tx))
}

/// Register a payment method (admin only).
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create_payment_method<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreatePaymentMethodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;

    let method = PaymentMethod::new(req.name).map_err(AppError::from)?;
    state
        .repo
        .create_payment_method(&method)
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(method)))
}

/// List all payment methods.
#[tracing::instrument(skip(state))]
pub async fn list_payment_methods<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let methods = state
        .repo
        .list_payment_methods()
        .await
        .map_err(AppError::from)?;
    Ok(Json(methods))
}

// ─────────────────────────────────────────────────────────────────────────────
// Posts
// ─────────────────────────────────────────────────────────────────────────────

/// Create a draft post owned by the caller.
#[tracing::instrument(skip(state, req), fields(slug = %req.slug))]
pub async fn create_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.create_post(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// List posts visible to the caller.
#[tracing::instrument(skip(state))]
pub async fn list_posts<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_posts(&actor).await?;
    Ok(Json(posts))
}

/// Get post by ID (admins any, employees their own).
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn get_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&id)?;
    let post = state.posts.get_post(&actor, post_id).await?;
    Ok(Json(post))
}

/// Owner submits a draft for review.
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn submit_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.submit(&actor, parse_post_id(&id)?).await?;
    Ok(Json(post))
}

/// Admin approves a pending post.
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn approve_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.approve(&actor, parse_post_id(&id)?).await?;
    Ok(Json(post))
}

/// Admin rejects a pending post.
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn reject_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.reject(&actor, parse_post_id(&id)?).await?;
    Ok(Json(post))
}

/// Admin takes a published post down.
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn unpublish_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.unpublish(&actor, parse_post_id(&id)?).await?;
    Ok(Json(post))
}

/// Admin restores an unpublished post.
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn restore_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.restore(&actor, parse_post_id(&id)?).await?;
    Ok(Json(post))
}

/// Owner deletes an unpublished post.
#[tracing::instrument(skip(state), fields(post_id = %id))]
pub async fn delete_post<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let _ = state.posts.delete(&actor, parse_post_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register a post type (admin only).
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create_post_type<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreatePostTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;

    let post_type = PostType::new(req.name).map_err(AppError::from)?;
    state
        .repo
        .create_post_type(&post_type)
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(post_type)))
}

/// List all post types.
#[tracing::instrument(skip(state))]
pub async fn list_post_types<R: BackofficeRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let types = state.repo.list_post_types().await.map_err(AppError::from)?;
    Ok(Json(types))
}

fn parse_post_id(id: &str) -> Result<PostId, ApiError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()).into())
}
