use super::session::SessionData;
use crate::AppState;

/// Helper: validasi session dari AppState dan kembalikan SessionData clone.
/// user_id hasil resolve di-thread eksplisit ke query, tidak ada state
/// user global.
pub fn validate_session(state: &AppState, token: &str) -> Result<SessionData, String> {
    let store = state.sessions.lock().map_err(|e| e.to_string())?;
    store.validate(token).cloned()
}
