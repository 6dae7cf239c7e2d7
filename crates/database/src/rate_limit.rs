//! Sliding-window request ledger.

use std::time::Duration;

use sqlx::SqlitePool;

use crate::error::Result;

/// Record a request for `(identifier, endpoint)` if the window has room.
///
/// Rows older than the window are pruned first. Returns `false` (and records
/// nothing) when `max_requests` already fall inside the window.
pub async fn check_and_record(
    pool: &SqlitePool,
    identifier: &str,
    endpoint: &str,
    max_requests: u32,
    window: Duration,
) -> Result<bool> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    check_and_record_at(pool, identifier, endpoint, max_requests, window, now_ms).await
}

/// [`check_and_record`] against an explicit clock reading.
pub async fn check_and_record_at(
    pool: &SqlitePool,
    identifier: &str,
    endpoint: &str,
    max_requests: u32,
    window: Duration,
    now_ms: i64,
) -> Result<bool> {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    let window_start = now_ms.saturating_sub(window_ms);

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM rate_limits
        WHERE identifier = ? AND endpoint = ? AND requested_at_ms <= ?
        "#,
    )
    .bind(identifier)
    .bind(endpoint)
    .bind(window_start)
    .execute(&mut *tx)
    .await?;

    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM rate_limits
        WHERE identifier = ? AND endpoint = ?
        "#,
    )
    .bind(identifier)
    .bind(endpoint)
    .fetch_one(&mut *tx)
    .await?;

    if count.0 >= i64::from(max_requests) {
        tx.commit().await?;
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO rate_limits (identifier, endpoint, requested_at_ms)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(identifier)
    .bind(endpoint)
    .bind(now_ms)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}
