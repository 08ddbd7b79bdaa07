pub mod contact;
pub mod education;
pub mod experience;
pub mod project;
pub mod store;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(education::router())
        .merge(project::router())
        .merge(experience::router())
        .merge(contact::router())
}
