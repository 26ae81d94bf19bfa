use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::get_config;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub login_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: HashMap<String, SessionData>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Membuat sesi baru dan mengembalikan session token (UUID v4).
    pub fn create(&mut self, user_id: i64, username: String, full_name: String, email: String) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let timeout_mins = get_config().security.session_timeout_mins as i64;
        self.sessions.insert(
            token.clone(),
            SessionData {
                user_id,
                username,
                full_name,
                email,
                login_at: now,
                expires_at: now + Duration::minutes(timeout_mins),
            },
        );
        token
    }

    /// Validasi session token — cek ada dan belum expired.
    pub fn validate(&self, token: &str) -> Result<&SessionData, String> {
        match self.sessions.get(token) {
            None => Err("Session is not valid, please sign in again.".into()),
            Some(s) if Utc::now() > s.expires_at => {
                Err("Session expired, please sign in again.".into())
            }
            Some(s) => Ok(s),
        }
    }

    /// Lookup tanpa cek expiry, untuk logging.
    pub fn get(&self, token: &str) -> Option<&SessionData> {
        self.sessions.get(token)
    }

    /// Hapus sesi (sign out).
    pub fn destroy(&mut self, token: &str) {
        self.sessions.remove(token);
    }
}
