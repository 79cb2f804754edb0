//! Format validation for common string patterns
//!
//! Pre-compiled regex validators for email, URL, UUID and ISO 8601 date/time text.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap()
});

/// Any RFC 4122 version, hyphenated
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-8][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$").unwrap()
});

/// Offset is optional: naive date-times are accepted
static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d{1,9})?)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap()
});

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)(:([0-5]\d)(\.\d{1,9})?)?$").unwrap()
});

/// Validate email format
///
/// ```
/// use ferrule_validation::formats::validate_email;
///
/// assert!(validate_email("user@example.com"));
/// assert!(!validate_email("invalid-email"));
/// ```
pub fn validate_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Validate URL format (http/https)
pub fn validate_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

/// Validate hyphenated UUID text
///
/// ```
/// use ferrule_validation::formats::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000"));
/// assert!(!validate_uuid("not-a-uuid"));
/// ```
pub fn validate_uuid(value: &str) -> bool {
    UUID_REGEX.is_match(value)
}

/// Validate ISO 8601 date-time text
pub fn validate_datetime(value: &str) -> bool {
    DATETIME_REGEX.is_match(value)
}

/// Validate `YYYY-MM-DD`
pub fn validate_date(value: &str) -> bool {
    DATE_REGEX.is_match(value)
}

/// Validate `HH:MM[:SS[.fff]]`
pub fn validate_time(value: &str) -> bool {
    TIME_REGEX.is_match(value)
}
