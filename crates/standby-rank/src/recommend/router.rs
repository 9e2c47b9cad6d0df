use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use super::service::{RecommendRequest, RecommendationService};
use super::sources::{EmptiesSource, ScheduleSource};
use crate::error::AppError;

/// Router builder exposing the recommendation endpoint.
pub fn recommendation_router<E, S>(service: Arc<RecommendationService<E, S>>) -> Router
where
    E: EmptiesSource + 'static,
    S: ScheduleSource + 'static,
{
    Router::new()
        .route("/api/v1/recommend", post(recommend_handler::<E, S>))
        .with_state(service)
}

pub(crate) async fn recommend_handler<E, S>(
    State(service): State<Arc<RecommendationService<E, S>>>,
    axum::Json(request): axum::Json<RecommendRequest>,
) -> Response
where
    E: EmptiesSource + 'static,
    S: ScheduleSource + 'static,
{
    match service.recommend(request) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}
