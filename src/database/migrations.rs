use sqlx::SqlitePool;

/// Menjalankan semua migrasi database (CREATE TABLE IF NOT EXISTS).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // ═══════════════════════════════════════
    // TABLE: users
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id              INTEGER  PRIMARY KEY AUTOINCREMENT,
            full_name       TEXT     NOT NULL,
            username        TEXT     NOT NULL UNIQUE,
            email           TEXT     NOT NULL UNIQUE,
            password_hash   TEXT     NOT NULL,
            avatar_initials TEXT     NOT NULL DEFAULT '',
            is_active       INTEGER  NOT NULL DEFAULT 1,
            created_at      DATETIME DEFAULT CURRENT_TIMESTAMP,
            last_login_at   DATETIME
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: cards
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cards (
            id              TEXT     PRIMARY KEY,
            owner_id        INTEGER  NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            vendor          TEXT     NOT NULL,
            coupon_type     TEXT     NOT NULL CHECK(coupon_type IN (
                                'cash discount', 'percentage off', 'buy one get one',
                                'free item', 'limited time offer')),
            reward_amount   REAL     NOT NULL CHECK(reward_amount >= 0),
            description     TEXT     NOT NULL,
            expiration      DATETIME NOT NULL,
            barcode_payload TEXT     NOT NULL,
            created_at      DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cards_owner ON cards(owner_id, created_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cards_vendor ON cards(vendor)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: activity_logs (Audit Trail)
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS activity_logs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER REFERENCES users(id) ON DELETE SET NULL,
            action      TEXT    NOT NULL, -- 'LOGIN', 'REGISTER', 'CARD_CREATE', etc.
            description TEXT    NOT NULL,
            metadata    TEXT,             -- JSON string for extra data
            created_at  DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    // ═══════════════════════════════════════
    // MIGRASI: Kolom baru (ALTER TABLE — aman untuk data existing)
    // ═══════════════════════════════════════

    // Symbology hasil scan, ditambahkan setelah mode qr masuk
    safe_add_column(pool, "cards", "symbology", "TEXT NOT NULL DEFAULT 'code128'").await;

    Ok(())
}

/// Helper: ALTER TABLE ADD COLUMN yang aman (abaikan jika kolom sudah ada).
async fn safe_add_column(pool: &SqlitePool, table: &str, column: &str, col_type: &str) {
    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, col_type);
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => {}
        Err(e) => {
            let msg = e.to_string();
            // SQLite error jika kolom sudah ada: "duplicate column name"
            if !msg.contains("duplicate column") {
                crate::log_warn!("DATABASE", &format!("Migration warning: {}", msg));
            }
        }
    }
}
