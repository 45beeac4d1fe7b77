use crate::models::{Showtime, ShowtimeSeat};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Get showtime by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Showtime>> {
    let showtime = sqlx::query_as::<_, Showtime>("SELECT * FROM showtimes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(showtime)
}

/// Authoritative seat table for a showtime, row by row
pub async fn list_seats(pool: &PgPool, showtime_id: Uuid) -> Result<Vec<ShowtimeSeat>> {
    let seats = sqlx::query_as::<_, ShowtimeSeat>(
        r#"
        SELECT * FROM showtime_seats
        WHERE showtime_id = $1
        ORDER BY seat_id ASC
        "#,
    )
    .bind(showtime_id)
    .fetch_all(pool)
    .await?;

    Ok(seats)
}
