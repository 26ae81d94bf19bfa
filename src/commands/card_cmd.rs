use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::AppError;
use crate::models::card::{Card, CardDraft, CardStats, CardView, DbCard};
use crate::AppState;

/// Ambil semua kartu milik user, terbaru lebih dulu. `search` memfilter
/// vendor (substring, case-insensitive), dipakai search bar di home.
#[tauri::command]
pub async fn get_cards(
    state: tauri::State<'_, AppState>,
    session_token: String,
    search: Option<String>,
) -> Result<Vec<CardView>, String> {
    let session = crate::auth::guard::validate_session(&state, &session_token)?;

    let search = search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let query = if search.is_some() {
        "SELECT * FROM cards
         WHERE owner_id = ? AND vendor LIKE '%' || ? || '%' COLLATE NOCASE
         ORDER BY created_at DESC"
    } else {
        "SELECT * FROM cards WHERE owner_id = ? ORDER BY created_at DESC"
    };

    let mut sql_query = sqlx::query_as::<_, DbCard>(query).bind(session.user_id);
    if let Some(ref term) = search {
        sql_query = sql_query.bind(term);
    }

    let rows = sql_query
        .fetch_all(&state.db)
        .await
        .map_err(|e| e.to_string())?;

    let mut cards = Vec::with_capacity(rows.len());
    for row in rows {
        let card = Card::try_from(row).map_err(String::from)?;
        cards.push(CardView::from(card));
    }

    Ok(cards)
}

/// Ambil satu kartu. Kartu milik user lain dilaporkan tidak ditemukan.
#[tauri::command]
pub async fn get_card_detail(
    state: tauri::State<'_, AppState>,
    session_token: String,
    card_id: String,
) -> Result<CardView, String> {
    let session = crate::auth::guard::validate_session(&state, &session_token)?;

    let row = sqlx::query_as::<_, DbCard>("SELECT * FROM cards WHERE id = ? AND owner_id = ?")
        .bind(&card_id)
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| String::from(AppError::NotFound("Card".into())))?;

    let card = Card::try_from(row).map_err(String::from)?;
    Ok(CardView::from(card))
}

/// Counter layar profile: total kartu, yang masih aktif, yang expired.
#[tauri::command]
pub async fn get_card_stats(
    state: tauri::State<'_, AppState>,
    session_token: String,
) -> Result<CardStats, String> {
    let session = crate::auth::guard::validate_session(&state, &session_token)?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let (scanned,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards WHERE owner_id = ?")
        .bind(session.user_id)
        .fetch_one(&state.db)
        .await
        .map_err(|e| e.to_string())?;

    let (expired,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cards WHERE owner_id = ? AND expiration <= ?")
            .bind(session.user_id)
            .bind(&now)
            .fetch_one(&state.db)
            .await
            .map_err(|e| e.to_string())?;

    Ok(CardStats {
        scanned,
        active: scanned - expired,
        expired,
    })
}

/// Persist draft yang sudah tervalidasi jadi card record baru. Dipanggil
/// dari alur submit di scan_cmd; owner_id di-thread eksplisit.
pub async fn insert_card(
    db: &sqlx::SqlitePool,
    owner_id: i64,
    draft: &CardDraft,
    reward_amount: f64,
    created_at: DateTime<Utc>,
) -> Result<Card, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let vendor = crate::validation::sanitize_string(draft.vendor.trim());
    let description = crate::validation::sanitize_string(draft.description.trim());

    sqlx::query(
        "INSERT INTO cards (id, owner_id, vendor, coupon_type, reward_amount,
                            description, expiration, barcode_payload, symbology, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&vendor)
    .bind(draft.coupon_type.as_str())
    .bind(reward_amount)
    .bind(&description)
    .bind(draft.expiration.to_rfc3339_opts(SecondsFormat::Millis, true))
    .bind(&draft.barcode_payload)
    .bind(draft.symbology.as_str())
    .bind(created_at.to_rfc3339_opts(SecondsFormat::Millis, true))
    .execute(db)
    .await?;

    let row = sqlx::query_as::<_, DbCard>("SELECT * FROM cards WHERE id = ?")
        .bind(&id)
        .fetch_one(db)
        .await?;

    Card::try_from(row)
}
