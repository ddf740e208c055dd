use crate::error::SessionError;

/// Check an expected first name typed by the requester and return it trimmed.
///
/// Allowed: ASCII and Latin-1 letters, whitespace, hyphens, apostrophes, periods.
pub fn validate_name(input: &str) -> Result<String, SessionError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(SessionError::Validation(
            "Please enter your first name".into(),
        ));
    }
    if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
        tracing::debug!(character = %bad.escape_debug(), "name rejected");
        return Err(SessionError::Validation(
            "First name can only contain letters, spaces, hyphens, apostrophes, and periods".into(),
        ));
    }
    Ok(name.to_string())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || (('\u{C0}'..='\u{FF}').contains(&c) && c != '\u{D7}' && c != '\u{F7}')
        || c.is_whitespace()
        || matches!(c, '-' | '\'' | '.')
}
