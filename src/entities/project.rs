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
use crate::util::is_valid_url;

const STATUSES: [&str; 3] = ["completed", "in-progress", "planned"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub status: String,
    pub featured: bool,
    pub category: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Entity for Project {
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static str = "id, title, description, long_description, technologies, \
         live_url, github_url, image_url, images, start_date, end_date, status, featured, \
         category, sort_order, is_active, created_at, updated_at";
    // Explicit ordering first, most recent start date as the tie-breaker.
    const DEFAULT_ORDER: &'static str = "sort_order ASC, start_date DESC";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub start_date: Date,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_status() -> String {
    "completed".into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub category: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectFilterQuery {
    pub featured: Option<bool>,
    pub category: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/:id", get(get_one).put(update).delete(remove))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ProjectFilterQuery>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let window = parse_pagination(&page);

    let mut filter = Filter::new();
    if let Some(featured) = filters.featured {
        filter = filter.eq_bool("featured", featured);
    }
    if let Some(category) = filters.category {
        filter = filter.eq_text("category", category);
    }

    let (items, total) = store::list::<Project>(&state.db, &filter, &window).await?;
    let meta = PageMeta::new(total, window.page, window.limit);
    Ok(Json(ApiResponse::with_pagination(
        items,
        "Projects retrieved successfully",
        meta,
    )))
}

#[instrument(skip(state))]
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = store::get::<Project>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    Ok(Json(ApiResponse::success(project, "Project retrieved successfully")))
}

#[instrument(skip(state, payload, admin))]
async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateProject>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    validate_status(&payload.status)?;
    for url in [&payload.live_url, &payload.github_url, &payload.image_url]
        .into_iter()
        .flatten()
    {
        if !is_valid_url(url) {
            return Err(ApiError::BadRequest(format!("Invalid URL: {url}")));
        }
    }

    let project = insert(&state.db, payload).await?;
    info!(id = %project.id, admin = %admin.username, "project created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(project, "Project created successfully")),
    ))
}

#[instrument(skip(state, payload, _admin))]
async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    if let Some(status) = &payload.status {
        validate_status(status)?;
    }
    let project = apply_update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    Ok(Json(ApiResponse::success(project, "Project updated successfully")))
}

#[instrument(skip(state, _admin))]
async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    store::soft_delete::<Project>(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    Ok(Json(ApiResponse::message("Project deleted successfully")))
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Status must be one of: {}",
            STATUSES.join(", ")
        )))
    }
}

async fn insert(db: &PgPool, payload: CreateProject) -> anyhow::Result<Project> {
    let sql = format!(
        "INSERT INTO projects (title, description, long_description, technologies,
             live_url, github_url, image_url, images, start_date, end_date, status,
             featured, category, sort_order)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         RETURNING {}",
        Project::COLUMNS
    );
    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.long_description)
        .bind(payload.technologies)
        .bind(payload.live_url)
        .bind(payload.github_url)
        .bind(payload.image_url)
        .bind(payload.images)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.status)
        .bind(payload.featured)
        .bind(payload.category)
        .bind(payload.sort_order)
        .fetch_one(db)
        .await?;
    Ok(project)
}

async fn apply_update(
    db: &PgPool,
    id: Uuid,
    payload: UpdateProject,
) -> anyhow::Result<Option<Project>> {
    let sql = format!(
        "UPDATE projects SET
             title = COALESCE($2, title),
             description = COALESCE($3, description),
             long_description = COALESCE($4, long_description),
             technologies = COALESCE($5, technologies),
             live_url = COALESCE($6, live_url),
             github_url = COALESCE($7, github_url),
             image_url = COALESCE($8, image_url),
             images = COALESCE($9, images),
             start_date = COALESCE($10, start_date),
             end_date = COALESCE($11, end_date),
             status = COALESCE($12, status),
             featured = COALESCE($13, featured),
             category = COALESCE($14, category),
             sort_order = COALESCE($15, sort_order),
             updated_at = now()
         WHERE id = $1 AND is_active = TRUE
         RETURNING {}",
        Project::COLUMNS
    );
    let project = sqlx::query_as::<_, Project>(&sql)
        .bind(id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.long_description)
        .bind(payload.technologies)
        .bind(payload.live_url)
        .bind(payload.github_url)
        .bind(payload.image_url)
        .bind(payload.images)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.status)
        .bind(payload.featured)
        .bind(payload.category)
        .bind(payload.sort_order)
        .fetch_optional(db)
        .await?;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_pass_validation() {
        for status in STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn unknown_status_is_a_bad_request() {
        let err = validate_status("done").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
