use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::{AdminUser, MaybeUser};
use crate::entities::store::{self, Entity, Filter};
use crate::error::ApiError;
use crate::pagination::{parse_pagination, PageMeta, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::util::{is_valid_email, sanitize_string};

const STATUSES: [&str; 3] = ["unread", "read", "replied"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub phone: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Entity for Contact {
    const TABLE: &'static str = "contacts";
    const COLUMNS: &'static str =
        "id, name, email, subject, message, phone, status, is_active, created_at, updated_at";
    const DEFAULT_ORDER: &'static str = "created_at DESC";
}

/// Submission body for the public contact form. Required fields are optional
/// here so presence failures surface as a 400 with the standard envelope.
#[derive(Debug, Deserialize)]
pub struct CreateContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactFilterQuery {
    pub status: Option<String>,
}

/// Reads and mutations are admin-only; creation is the public contact form.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", get(list).post(create))
        .route("/contact/:id", get(get_one).put(update).delete(remove))
}

#[instrument(skip(state, _admin))]
async fn list(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ContactFilterQuery>,
) -> Result<Json<ApiResponse<Vec<Contact>>>, ApiError> {
    let window = parse_pagination(&page);

    let mut filter = Filter::new();
    if let Some(status) = filters.status {
        filter = filter.eq_text("status", status);
    }

    let (items, total) = store::list::<Contact>(&state.db, &filter, &window).await?;
    let meta = PageMeta::new(total, window.page, window.limit);
    Ok(Json(ApiResponse::with_pagination(
        items,
        "Contact messages retrieved successfully",
        meta,
    )))
}

#[instrument(skip(state, _admin))]
async fn get_one(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Contact>>, ApiError> {
    let contact = store::get::<Contact>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact message not found".into()))?;
    Ok(Json(ApiResponse::success(
        contact,
        "Contact message retrieved successfully",
    )))
}

/// Public endpoint for contact form submissions. Free-text fields are
/// sanitized before storage.
#[instrument(skip(state, payload, submitter))]
async fn create(
    State(state): State<AppState>,
    MaybeUser(submitter): MaybeUser,
    Json(payload): Json<CreateContact>,
) -> Result<(StatusCode, Json<ApiResponse<Contact>>), ApiError> {
    let (Some(name), Some(email), Some(message)) = (payload.name, payload.email, payload.message)
    else {
        return Err(ApiError::BadRequest("Name, email, and message are required".into()));
    };

    let name = sanitize_string(&name);
    let message = sanitize_string(&message);
    let email = email.trim().to_lowercase();

    if name.is_empty() || message.is_empty() {
        return Err(ApiError::BadRequest("Name, email, and message are required".into()));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email format".into()));
    }

    let subject = payload.subject.as_deref().map(sanitize_string);
    let contact = insert(&state.db, name, email, subject, message, payload.phone).await?;

    info!(
        id = %contact.id,
        authenticated = submitter.is_some(),
        "contact message received"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(contact, "Contact message created successfully")),
    ))
}

#[instrument(skip(state, payload, _admin))]
async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContact>,
) -> Result<Json<ApiResponse<Contact>>, ApiError> {
    if let Some(status) = &payload.status {
        if !STATUSES.contains(&status.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Status must be one of: {}",
                STATUSES.join(", ")
            )));
        }
    }
    let contact = apply_update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact message not found".into()))?;
    Ok(Json(ApiResponse::success(
        contact,
        "Contact message updated successfully",
    )))
}

#[instrument(skip(state, _admin))]
async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    store::soft_delete::<Contact>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact message not found".into()))?;
    Ok(Json(ApiResponse::message("Contact message deleted successfully")))
}

async fn insert(
    db: &PgPool,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    phone: Option<String>,
) -> anyhow::Result<Contact> {
    let sql = format!(
        "INSERT INTO contacts (name, email, subject, message, phone)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        Contact::COLUMNS
    );
    let contact = sqlx::query_as::<_, Contact>(&sql)
        .bind(name)
        .bind(email)
        .bind(subject)
        .bind(message)
        .bind(phone)
        .fetch_one(db)
        .await?;
    Ok(contact)
}

async fn apply_update(
    db: &PgPool,
    id: Uuid,
    payload: UpdateContact,
) -> anyhow::Result<Option<Contact>> {
    let sql = format!(
        "UPDATE contacts SET
             name = COALESCE($2, name),
             email = COALESCE($3, email),
             subject = COALESCE($4, subject),
             message = COALESCE($5, message),
             phone = COALESCE($6, phone),
             status = COALESCE($7, status),
             updated_at = now()
         WHERE id = $1 AND is_active = TRUE
         RETURNING {}",
        Contact::COLUMNS
    );
    let contact = sqlx::query_as::<_, Contact>(&sql)
        .bind(id)
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.subject)
        .bind(payload.message)
        .bind(payload.phone)
        .bind(payload.status)
        .fetch_optional(db)
        .await?;
    Ok(contact)
}
