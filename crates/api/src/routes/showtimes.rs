use axum::{
    extract::{Path, State},
    Json,
};
use cineseat_core::showtime;
use cineseat_types::api::ShowtimeSeatsResponse;
use uuid::Uuid;

use crate::middleware::AppState;
use crate::response::ApiError;

/// Live seat map for a showtime. Public: browsing seats needs no account.
/// Reading through the engine lazily reaps expired holds.
pub async fn get_showtime_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShowtimeSeatsResponse>, ApiError> {
    let seats = showtime::seats_status(&state.db, &state.engine, &state.config, id).await?;
    Ok(Json(seats))
}
