use axum::extract::Extension;
use axum::Json;

use crate::common::Error;
use crate::domains::jobs::StoreStats;
use crate::server::app::AppState;

/// Basic job and artifact counts.
pub async fn stats_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<StoreStats>, Error> {
    Ok(Json(state.jobs.stats().await?))
}
