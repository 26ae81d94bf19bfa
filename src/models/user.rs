use serde::{Deserialize, Serialize};

/// Struct dari database — untuk query_as.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DbUser {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_initials: String,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// Struct yang dikirim ke frontend (tanpa password_hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar_initials: String,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub last_login_at: Option<String>,
}

impl From<DbUser> for User {
    fn from(u: DbUser) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            username: u.username,
            email: u.email,
            avatar_initials: u.avatar_initials,
            is_active: u.is_active,
            created_at: u.created_at,
            last_login_at: u.last_login_at,
        }
    }
}

/// Hasil login/register yang dikirim ke frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub user: AuthUserData,
    pub session_token: String,
    pub login_at: String,
}

/// Data user dalam LoginResult.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserData {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar_initials: String,
}

/// Payload pendaftaran akun baru.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}
