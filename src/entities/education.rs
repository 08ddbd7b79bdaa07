use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AdminUser;
use crate::entities::store::{self, Entity, Filter};
use crate::error::ApiError;
use crate::pagination::{parse_pagination, PageMeta, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Entity for Education {
    const TABLE: &'static str = "education";
    const COLUMNS: &'static str = "id, institution, degree, field, start_date, end_date, \
         description, grade, location, logo_url, is_active, created_at, updated_at";
    const DEFAULT_ORDER: &'static str = "start_date DESC";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEducation {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field: Option<String>,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Partial update: absent fields keep their stored values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEducation {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/education", get(list).post(create))
        .route("/education/:id", get(get_one).put(update).delete(remove))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Education>>>, ApiError> {
    let window = parse_pagination(&query);
    let (items, total) = store::list::<Education>(&state.db, &Filter::new(), &window).await?;
    let meta = PageMeta::new(total, window.page, window.limit);
    Ok(Json(ApiResponse::with_pagination(
        items,
        "Education records retrieved successfully",
        meta,
    )))
}

#[instrument(skip(state))]
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Education>>, ApiError> {
    let record = store::get::<Education>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Education record not found".into()))?;
    Ok(Json(ApiResponse::success(
        record,
        "Education record retrieved successfully",
    )))
}

#[instrument(skip(state, payload, admin))]
async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateEducation>,
) -> Result<(StatusCode, Json<ApiResponse<Education>>), ApiError> {
    let record = insert(&state.db, payload).await?;
    info!(id = %record.id, admin = %admin.username, "education record created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(record, "Education record created successfully")),
    ))
}

#[instrument(skip(state, payload, _admin))]
async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEducation>,
) -> Result<Json<ApiResponse<Education>>, ApiError> {
    let record = apply_update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Education record not found".into()))?;
    Ok(Json(ApiResponse::success(
        record,
        "Education record updated successfully",
    )))
}

#[instrument(skip(state, _admin))]
async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    store::soft_delete::<Education>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Education record not found".into()))?;
    Ok(Json(ApiResponse::message("Education record deleted successfully")))
}

async fn insert(db: &PgPool, payload: CreateEducation) -> anyhow::Result<Education> {
    let sql = format!(
        "INSERT INTO education (institution, degree, field, start_date, end_date,
             description, grade, location, logo_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        Education::COLUMNS
    );
    let record = sqlx::query_as::<_, Education>(&sql)
        .bind(payload.institution)
        .bind(payload.degree)
        .bind(payload.field)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.description)
        .bind(payload.grade)
        .bind(payload.location)
        .bind(payload.logo_url)
        .fetch_one(db)
        .await?;
    Ok(record)
}

async fn apply_update(
    db: &PgPool,
    id: Uuid,
    payload: UpdateEducation,
) -> anyhow::Result<Option<Education>> {
    let sql = format!(
        "UPDATE education SET
             institution = COALESCE($2, institution),
             degree = COALESCE($3, degree),
             field = COALESCE($4, field),
             start_date = COALESCE($5, start_date),
             end_date = COALESCE($6, end_date),
             description = COALESCE($7, description),
             grade = COALESCE($8, grade),
             location = COALESCE($9, location),
             logo_url = COALESCE($10, logo_url),
             updated_at = now()
         WHERE id = $1 AND is_active = TRUE
         RETURNING {}",
        Education::COLUMNS
    );
    let record = sqlx::query_as::<_, Education>(&sql)
        .bind(id)
        .bind(payload.institution)
        .bind(payload.degree)
        .bind(payload.field)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.description)
        .bind(payload.grade)
        .bind(payload.location)
        .bind(payload.logo_url)
        .fetch_optional(db)
        .await?;
    Ok(record)
}
