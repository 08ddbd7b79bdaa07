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
pub struct Experience {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub description: String,
    pub technologies: Vec<String>,
    pub achievements: Vec<String>,
    pub company_url: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Entity for Experience {
    const TABLE: &'static str = "experiences";
    const COLUMNS: &'static str = "id, company, position, location, start_date, end_date, \
         description, technologies, achievements, company_url, logo_url, is_active, \
         created_at, updated_at";
    const DEFAULT_ORDER: &'static str = "start_date DESC";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExperience {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExperience {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
    pub company_url: Option<String>,
    pub logo_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/experience", get(list).post(create))
        .route("/experience/:id", get(get_one).put(update).delete(remove))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Experience>>>, ApiError> {
    let window = parse_pagination(&query);
    let (items, total) = store::list::<Experience>(&state.db, &Filter::new(), &window).await?;
    let meta = PageMeta::new(total, window.page, window.limit);
    Ok(Json(ApiResponse::with_pagination(
        items,
        "Experience records retrieved successfully",
        meta,
    )))
}

#[instrument(skip(state))]
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Experience>>, ApiError> {
    let record = store::get::<Experience>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Experience record not found".into()))?;
    Ok(Json(ApiResponse::success(
        record,
        "Experience record retrieved successfully",
    )))
}

#[instrument(skip(state, payload, admin))]
async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateExperience>,
) -> Result<(StatusCode, Json<ApiResponse<Experience>>), ApiError> {
    let record = insert(&state.db, payload).await?;
    info!(id = %record.id, admin = %admin.username, "experience record created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(record, "Experience record created successfully")),
    ))
}

#[instrument(skip(state, payload, _admin))]
async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExperience>,
) -> Result<Json<ApiResponse<Experience>>, ApiError> {
    let record = apply_update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Experience record not found".into()))?;
    Ok(Json(ApiResponse::success(
        record,
        "Experience record updated successfully",
    )))
}

#[instrument(skip(state, _admin))]
async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    store::soft_delete::<Experience>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Experience record not found".into()))?;
    Ok(Json(ApiResponse::message("Experience record deleted successfully")))
}

async fn insert(db: &PgPool, payload: CreateExperience) -> anyhow::Result<Experience> {
    let sql = format!(
        "INSERT INTO experiences (company, position, location, start_date, end_date,
             description, technologies, achievements, company_url, logo_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {}",
        Experience::COLUMNS
    );
    let record = sqlx::query_as::<_, Experience>(&sql)
        .bind(payload.company)
        .bind(payload.position)
        .bind(payload.location)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.description)
        .bind(payload.technologies)
        .bind(payload.achievements)
        .bind(payload.company_url)
        .bind(payload.logo_url)
        .fetch_one(db)
        .await?;
    Ok(record)
}

async fn apply_update(
    db: &PgPool,
    id: Uuid,
    payload: UpdateExperience,
) -> anyhow::Result<Option<Experience>> {
    let sql = format!(
        "UPDATE experiences SET
             company = COALESCE($2, company),
             position = COALESCE($3, position),
             location = COALESCE($4, location),
             start_date = COALESCE($5, start_date),
             end_date = COALESCE($6, end_date),
             description = COALESCE($7, description),
             technologies = COALESCE($8, technologies),
             achievements = COALESCE($9, achievements),
             company_url = COALESCE($10, company_url),
             logo_url = COALESCE($11, logo_url),
             updated_at = now()
         WHERE id = $1 AND is_active = TRUE
         RETURNING {}",
        Experience::COLUMNS
    );
    let record = sqlx::query_as::<_, Experience>(&sql)
        .bind(id)
        .bind(payload.company)
        .bind(payload.position)
        .bind(payload.location)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.description)
        .bind(payload.technologies)
        .bind(payload.achievements)
        .bind(payload.company_url)
        .bind(payload.logo_url)
        .fetch_optional(db)
        .await?;
    Ok(record)
}
