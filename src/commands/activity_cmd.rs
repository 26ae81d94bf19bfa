use crate::models::activity::ActivityLog;
use crate::AppState;

/// Ambil log aktivitas milik user yang sedang login.
#[tauri::command]
pub async fn get_activity_logs(
    state: tauri::State<'_, AppState>,
    session_token: String,
    limit: i64,
) -> Result<Vec<ActivityLog>, String> {
    let session = crate::auth::guard::validate_session(&state, &session_token)?;

    let logs = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT * FROM activity_logs
        WHERE user_id = ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(session.user_id)
    .bind(limit)
    .fetch_all(&state.db)
    .await
    .map_err(|e| e.to_string())?;

    Ok(logs)
}

/// Helper internal untuk mencatat aktivitas
pub async fn log_activity(
    db: &sqlx::SqlitePool,
    user_id: Option<i64>,
    action: &str,
    description: &str,
    metadata: Option<&str>,
) {
    let _ = sqlx::query(
        "INSERT INTO activity_logs (user_id, action, description, metadata) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(action)
    .bind(description)
    .bind(metadata)
    .execute(db)
    .await;
}
