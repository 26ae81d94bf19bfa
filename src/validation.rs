//! Input validation module
//!
//! This module provides centralized input validation for:
//! - Card drafts coming out of the scan flow (per-field inline errors)
//! - Account input (full name, username, email, password)
//! - String sanitization before persistence

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::card::CardDraft;

/// Validation result type for single-field checks
pub type ValidationResult = Result<(), String>;

/// One optional inline message per draft field. `None` means the field
/// passed its checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub vendor: Option<String>,
    pub reward_detail: Option<String>,
    pub description: Option<String>,
    pub expiration: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none()
            && self.reward_detail.is_none()
            && self.description.is_none()
            && self.expiration.is_none()
    }
}

/// Outcome of a full draft validation pass. Never an Err: invalid input
/// is data, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftValidation {
    pub valid: bool,
    pub errors: FieldErrors,
}

/// Validate every field of a card draft against `now`.
///
/// All four rules always run; a failure in one field never hides a
/// failure in another. Messages are the inline texts shown next to the
/// offending form field.
pub fn validate_card_draft(draft: &CardDraft, now: DateTime<Utc>) -> DraftValidation {
    let errors = FieldErrors {
        vendor: check_vendor(&draft.vendor).err(),
        reward_detail: check_reward_detail(&draft.reward_detail).err(),
        description: check_description(&draft.description).err(),
        expiration: check_expiration(draft.expiration, now).err(),
    };

    DraftValidation {
        valid: errors.is_empty(),
        errors,
    }
}

fn check_vendor(vendor: &str) -> ValidationResult {
    if vendor.trim().is_empty() {
        return Err("Vendor is required.".into());
    }
    Ok(())
}

/// Reward detail harus angka. Persisted reward_amount selalu finite dan
/// tidak negatif, jadi nilai negatif juga ditolak di sini.
fn check_reward_detail(detail: &str) -> ValidationResult {
    let trimmed = detail.trim();
    if trimmed.is_empty() {
        return Err("Reward detail is required.".into());
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
        _ => Err("Invalid input type.".into()),
    }
}

fn check_description(description: &str) -> ValidationResult {
    if description.trim().is_empty() {
        return Err("Description is required.".into());
    }
    Ok(())
}

fn check_expiration(expiration: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult {
    if expiration <= now {
        return Err("Expiration date must be in the future.".into());
    }
    Ok(())
}

/// Validate a username
/// - Length: 3-50 characters
/// - Allowed: alphanumeric, underscore, hyphen
/// - Must start with letter
pub fn validate_username(username: &str) -> ValidationResult {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err("Username is required.".into());
    }

    if trimmed.len() < 3 || trimmed.len() > 50 {
        return Err("Username must be 3-50 characters.".into());
    }

    if !trimmed.chars().next().unwrap().is_alphabetic() {
        return Err("Username must start with a letter.".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Username may only contain letters, numbers, underscore and hyphen.".into());
    }

    Ok(())
}

/// Validate a full name
/// - Length: 2-100 characters
/// - Allowed: letters, spaces, basic punctuation
pub fn validate_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Full name is required.".into());
    }

    if trimmed.len() < 2 || trimmed.len() > 100 {
        return Err("Full name must be 2-100 characters.".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || ".-'".contains(c))
    {
        return Err("Full name may only contain letters, spaces and .-' characters.".into());
    }

    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err("Email is required.".into());
    }

    if trimmed.len() > 254 {
        return Err("Email is too long (max 254 characters).".into());
    }

    if !trimmed.contains('@') {
        return Err("Email must contain '@'.".into());
    }

    let parts: Vec<&str> = trimmed.split('@').collect();
    if parts.len() != 2 {
        return Err("Email format is not valid.".into());
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() || local.len() > 64 {
        return Err("Email format is not valid.".into());
    }

    if !domain.contains('.') {
        return Err("Email domain is not valid.".into());
    }

    Ok(())
}

/// Validate password strength
/// - Minimum length: 8 characters
/// - Must contain: uppercase, lowercase, number
pub fn validate_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return Err("Password is required.".into());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters.".into());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters.".into());
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());

    if !has_upper || !has_lower || !has_digit {
        return Err("Password must contain an uppercase letter, a lowercase letter and a number.".into());
    }

    Ok(())
}

/// Sanitize string input (remove potentially dangerous characters)
pub fn sanitize_string(input: &str) -> String {
    input.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::session::Symbology;
    use chrono::Duration;

    fn draft_at(now: DateTime<Utc>) -> CardDraft {
        CardDraft::seeded("012345678905".to_string(), Symbology::Ean13, now)
    }

    fn filled_draft(now: DateTime<Utc>) -> CardDraft {
        let mut draft = draft_at(now);
        draft.vendor = "Acme".to_string();
        draft.reward_detail = "5".to_string();
        draft.description = "Five dollars off".to_string();
        draft.expiration = now + Duration::days(7);
        draft
    }

    #[test]
    fn test_fresh_draft_fails_all_four_fields() {
        let now = Utc::now();
        let result = validate_card_draft(&draft_at(now), now);
        assert!(!result.valid);
        assert!(result.errors.vendor.is_some());
        assert!(result.errors.reward_detail.is_some());
        assert!(result.errors.description.is_some());
        assert!(result.errors.expiration.is_some());
    }

    #[test]
    fn test_filled_draft_is_valid() {
        let now = Utc::now();
        let result = validate_card_draft(&filled_draft(now), now);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let now = Utc::now();
        let mut draft = filled_draft(now);
        draft.vendor = "  ".to_string();
        let first = validate_card_draft(&draft, now);
        let second = validate_card_draft(&draft, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fields_are_independent() {
        let now = Utc::now();
        let mut draft = draft_at(now);
        let before = validate_card_draft(&draft, now);

        draft.vendor = "Acme".to_string();
        let after = validate_card_draft(&draft, now);

        assert!(after.errors.vendor.is_none());
        assert_eq!(before.errors.reward_detail, after.errors.reward_detail);
        assert_eq!(before.errors.description, after.errors.description);
        assert_eq!(before.errors.expiration, after.errors.expiration);
    }

    #[test]
    fn test_reward_detail_must_be_numeric() {
        let now = Utc::now();
        let mut draft = filled_draft(now);

        draft.reward_detail = "ten".to_string();
        assert_eq!(
            validate_card_draft(&draft, now).errors.reward_detail,
            Some("Invalid input type.".to_string())
        );

        draft.reward_detail = "NaN".to_string();
        assert!(validate_card_draft(&draft, now).errors.reward_detail.is_some());

        draft.reward_detail = "-3".to_string();
        assert!(validate_card_draft(&draft, now).errors.reward_detail.is_some());

        draft.reward_detail = " 19.999 ".to_string();
        assert!(validate_card_draft(&draft, now).errors.reward_detail.is_none());
    }

    #[test]
    fn test_expiration_boundary() {
        let now = Utc::now();
        let mut draft = filled_draft(now);

        draft.expiration = now;
        assert_eq!(
            validate_card_draft(&draft, now).errors.expiration,
            Some("Expiration date must be in the future.".to_string())
        );

        draft.expiration = now + Duration::milliseconds(1);
        assert!(validate_card_draft(&draft, now).errors.expiration.is_none());
    }

    #[test]
    fn test_whitespace_only_fields_are_rejected() {
        let now = Utc::now();
        let mut draft = filled_draft(now);
        draft.vendor = "   ".to_string();
        draft.description = "\t\n".to_string();
        let result = validate_card_draft(&draft, now);
        assert_eq!(result.errors.vendor, Some("Vendor is required.".to_string()));
        assert_eq!(
            result.errors.description,
            Some("Description is required.".to_string())
        );
        assert!(!result.valid);
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("Sup3rSecret").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("NODIGITSHERE").is_err());
    }

    #[test]
    fn test_sanitize_string_strips_control_chars() {
        assert_eq!(sanitize_string("Acme\u{0000} Store\n"), "Acme Store");
    }
}
