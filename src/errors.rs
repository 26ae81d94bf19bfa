use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Error: {0}")]
    Internal(String),
}

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

/// Sanitize store error untuk frontend - sembunyikan detail internal.
pub fn sanitize_store_error(error: &str, context: &str) -> String {
    crate::log_error!("STORE", context, error.to_string());

    let error_lower = error.to_lowercase();

    if error_lower.contains("rate limit") {
        // Rate limit message is useful as-is
        return error.to_string();
    }

    if error_lower.contains("connection")
        || error_lower.contains("network")
        || error_lower.contains("timeout")
    {
        return "Could not reach the card store. Check your connection and try again.".to_string();
    }

    if error_lower.contains("database") || error_lower.contains("sql") {
        return "There was an error saving your card. Please try again.".to_string();
    }

    "There was an error saving your card. Please try again.".to_string()
}
