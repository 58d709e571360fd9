//! Input validation for user-supplied text: display names, quest and reward
//! titles, passcodes and the parent PIN.
//!
//! Every validator trims, checks, and returns the cleaned value so callers
//! never store the raw input.

use thiserror::Error;

/// Maximum length for a player display name.
pub const MAX_NAME_LEN: usize = 30;

/// Maximum length for quest/reward titles and wishlist text.
pub const MAX_TITLE_LEN: usize = 80;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name is too long (maximum {max} characters)")]
    NameTooLong { max: usize },

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title is too long (maximum {max} characters)")]
    TitleTooLong { max: usize },

    #[error("name must not contain control characters")]
    ControlCharacters,

    #[error("passcode must be exactly 4 digits")]
    BadPasscode,
}

/// Player display name: trimmed, non-empty, printable, length-capped.
/// Unicode (including emoji) is welcome; control characters are not.
pub fn validate_display_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }
    Ok(trimmed.to_string())
}

/// Quest/reward title or wishlist text: trimmed, non-empty, length-capped.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }
    Ok(trimmed.to_string())
}

/// Player passcode and parent PIN: exactly four ASCII digits.
pub fn validate_passcode(code: &str) -> Result<String, ValidationError> {
    let trimmed = code.trim();
    if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::BadPasscode);
    }
    Ok(trimmed.to_string())
}

/// Make user-supplied text safe for a log line: control characters stripped,
/// long text truncated with an ellipsis.
pub fn compact_for_log(text: &str, max_chars: usize) -> String {
    let cleaned: String = text.chars().filter(|c| !c.is_control()).collect();
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let truncated: String = cleaned.chars().take(max_chars).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_trimmed_and_bounded() {
        assert_eq!(validate_display_name("  Avery ").unwrap(), "Avery");
        assert!(validate_display_name("🚀 Robin").is_ok());
        assert!(matches!(
            validate_display_name("   "),
            Err(ValidationError::EmptyName)
        ));
        assert!(matches!(
            validate_display_name(&"a".repeat(40)),
            Err(ValidationError::NameTooLong { .. })
        ));
        assert!(matches!(
            validate_display_name("Avery\x07"),
            Err(ValidationError::ControlCharacters)
        ));
    }

    #[test]
    fn titles_follow_the_same_rules() {
        assert_eq!(validate_title(" Do dishes ").unwrap(), "Do dishes");
        assert!(matches!(
            validate_title(""),
            Err(ValidationError::EmptyTitle)
        ));
        assert!(matches!(
            validate_title(&"x".repeat(100)),
            Err(ValidationError::TitleTooLong { .. })
        ));
    }

    #[test]
    fn passcodes_are_exactly_four_digits() {
        assert_eq!(validate_passcode("0420").unwrap(), "0420");
        assert_eq!(validate_passcode(" 1234 ").unwrap(), "1234");
        assert!(validate_passcode("123").is_err());
        assert!(validate_passcode("12345").is_err());
        assert!(validate_passcode("12a4").is_err());
        assert!(validate_passcode("").is_err());
    }

    #[test]
    fn log_compaction_strips_and_truncates() {
        assert_eq!(compact_for_log("plain", 10), "plain");
        assert_eq!(compact_for_log("tab\there", 20), "tabhere");
        assert_eq!(compact_for_log("abcdefghij", 5), "abcde…");
    }
}
