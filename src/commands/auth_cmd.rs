use crate::errors::AppError;
use crate::models::user::{AuthUserData, DbUser, LoginResult, RegisterPayload, User};
use crate::validation;
use crate::AppState;

/// Daftar akun baru, langsung sign in (buat session).
#[tauri::command]
pub async fn register(
    state: tauri::State<'_, AppState>,
    payload: RegisterPayload,
) -> Result<LoginResult, String> {
    validation::validate_name(&payload.full_name).map_err(AppError::Validation)?;
    validation::validate_username(&payload.username).map_err(AppError::Validation)?;
    validation::validate_email(&payload.email).map_err(AppError::Validation)?;
    validation::validate_password(&payload.password).map_err(AppError::Validation)?;

    let full_name = validation::sanitize_string(payload.full_name.trim());
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    // Pre-check supaya pesan error spesifik per kolom
    let taken: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&state.db)
        .await
        .map_err(|e| e.to_string())?;
    if taken.0 > 0 {
        return Err("Email is already registered.".into());
    }

    let taken: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(&username)
        .fetch_one(&state.db)
        .await
        .map_err(|e| e.to_string())?;
    if taken.0 > 0 {
        return Err("Username is already taken.".into());
    }

    let cost = crate::config::get_config().security.bcrypt_cost;
    let hashed = bcrypt::hash(&payload.password, cost).map_err(|e| e.to_string())?;
    let initials = avatar_initials(&full_name, &username);

    let result = sqlx::query(
        "INSERT INTO users (full_name, username, email, password_hash, avatar_initials)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&full_name)
    .bind(&username)
    .bind(&email)
    .bind(&hashed)
    .bind(&initials)
    .execute(&state.db)
    .await;

    let user_id = match result {
        Ok(res) => res.last_insert_rowid(),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            // Race dengan register lain di antara pre-check dan insert
            return Err("Email or username is already taken.".into());
        }
        Err(e) => return Err(e.to_string()),
    };

    let token = state.sessions.lock().map_err(|e| e.to_string())?.create(
        user_id,
        username.clone(),
        full_name.clone(),
        email.clone(),
    );

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(user_id),
        "REGISTER",
        &format!("Account @{} created", username),
        None,
    )
    .await;

    crate::log_info!(
        "AUTH",
        "New account registered",
        serde_json::json!({ "user_id": user_id, "username": username })
    );

    Ok(LoginResult {
        user: AuthUserData {
            id: user_id,
            full_name,
            username,
            email,
            avatar_initials: initials,
        },
        session_token: token,
        login_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Sign in dengan email + password, buat session.
#[tauri::command]
pub async fn login(
    state: tauri::State<'_, AppState>,
    email: String,
    password: String,
) -> Result<LoginResult, String> {
    let email = email.trim().to_lowercase();

    let user =
        sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE email = ? AND is_active = 1")
            .bind(&email)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| e.to_string())?
            .ok_or("Email is not registered or the account is inactive.")?;

    let valid = bcrypt::verify(&password, &user.password_hash)
        .map_err(|_| "Could not verify password.")?;
    if !valid {
        return Err("Incorrect password.".into());
    }

    // Catat last login
    sqlx::query("UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(user.id)
        .execute(&state.db)
        .await
        .ok();

    let token = state.sessions.lock().map_err(|e| e.to_string())?.create(
        user.id,
        user.username.clone(),
        user.full_name.clone(),
        user.email.clone(),
    );

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(user.id),
        "LOGIN",
        &format!("User @{} signed in", user.username),
        None,
    )
    .await;

    Ok(LoginResult {
        user: AuthUserData {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            email: user.email,
            avatar_initials: user.avatar_initials,
        },
        session_token: token,
        login_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Sign out — hapus session.
#[tauri::command]
pub async fn logout(
    state: tauri::State<'_, AppState>,
    session_token: String,
) -> Result<(), String> {
    // Ambil user id sebelum session dihapus, untuk logging
    let user_id = {
        let sessions = state.sessions.lock().map_err(|e| e.to_string())?;
        sessions.get(&session_token).map(|s| s.user_id)
    };

    state
        .sessions
        .lock()
        .map_err(|e| e.to_string())?
        .destroy(&session_token);

    if let Some(id) = user_id {
        crate::commands::activity_cmd::log_activity(
            &state.db,
            Some(id),
            "LOGOUT",
            "User signed out",
            None,
        )
        .await;
    }

    Ok(())
}

/// Cek apakah session masih valid (untuk auto-login saat app reload).
#[tauri::command]
pub async fn check_session(
    state: tauri::State<'_, AppState>,
    session_token: String,
) -> Result<AuthUserData, String> {
    let session = crate::auth::guard::validate_session(&state, &session_token)?;

    let user = sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE id = ? AND is_active = 1")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Session is not valid, please sign in again.")?;

    Ok(AuthUserData {
        id: user.id,
        full_name: user.full_name,
        username: user.username,
        email: user.email,
        avatar_initials: user.avatar_initials,
    })
}

/// Profil lengkap user yang sedang login, untuk layar profile.
#[tauri::command]
pub async fn get_profile(
    state: tauri::State<'_, AppState>,
    session_token: String,
) -> Result<User, String> {
    let session = crate::auth::guard::validate_session(&state, &session_token)?;

    let user = sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE id = ?")
        .bind(session.user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| String::from(AppError::NotFound("User".into())))?;

    Ok(User::from(user))
}

/// Inisial avatar dari nama lengkap (maks 2 huruf), fallback ke huruf
/// pertama username.
fn avatar_initials(full_name: &str, username: &str) -> String {
    let initials: String = full_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(|c| c.to_uppercase())
        .collect();

    if initials.is_empty() {
        username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    } else {
        initials
    }
}
