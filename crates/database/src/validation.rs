//! Input normalization for handles, organization names and codes.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty value where one is required.
    Empty(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Value contains characters that are not allowed.
    InvalidCharacters(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::InvalidCharacters(field) => {
                write!(f, "{} contains invalid characters", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Telegram handles are at most 32 characters.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Maximum allowed length for organization names.
pub const MAX_ORG_NAME_LENGTH: usize = 100;

/// Maximum allowed length for organization codes.
pub const MAX_ORG_CODE_LENGTH: usize = 32;

/// Normalize a Telegram handle: trim whitespace and strip one leading "@".
///
/// Does not validate; see [`validate_username`].
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Normalize and validate a handle typed by a user.
pub fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let username = normalize_username(raw);

    if username.is_empty() {
        return Err(ValidationError::Empty("username".to_string()));
    }

    let len = username.chars().count();
    if len > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
            actual: len,
        });
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters("username".to_string()));
    }

    Ok(username)
}

/// Trim and validate an organization name.
pub fn validate_org_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(ValidationError::Empty("organization name".to_string()));
    }

    let len = name.chars().count();
    if len > MAX_ORG_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "organization name".to_string(),
            max: MAX_ORG_NAME_LENGTH,
            actual: len,
        });
    }

    Ok(name.to_string())
}

/// Trim, upper-case and validate an organization code.
pub fn normalize_org_code(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim().to_uppercase();

    if code.is_empty() {
        return Err(ValidationError::Empty("organization code".to_string()));
    }

    let len = code.chars().count();
    if len > MAX_ORG_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "organization code".to_string(),
            max: MAX_ORG_CODE_LENGTH,
            actual: len,
        });
    }

    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidCharacters(
            "organization code".to_string(),
        ));
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("@Alice"), "Alice");
        assert_eq!(normalize_username("  @bob  "), "bob");
        assert_eq!(normalize_username("carol"), "carol");
        assert_eq!(normalize_username("@"), "");
        assert_eq!(normalize_username("   "), "");
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("@new_client").unwrap(), "new_client");
        assert!(matches!(
            validate_username("@"),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_username("two words"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        let long = "a".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(matches!(
            validate_username(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_org_name() {
        assert_eq!(validate_org_name("  Alpha Gym ").unwrap(), "Alpha Gym");
        assert!(validate_org_name("   ").is_err());
    }

    #[test]
    fn test_normalize_org_code() {
        assert_eq!(normalize_org_code(" alpha ").unwrap(), "ALPHA");
        assert!(normalize_org_code("").is_err());
        assert!(normalize_org_code("al pha").is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Empty("username".to_string());
        assert_eq!(err.to_string(), "username cannot be empty");

        let err = ValidationError::TooLong {
            field: "organization code".to_string(),
            max: 32,
            actual: 40,
        };
        assert_eq!(
            err.to_string(),
            "organization code is too long (40 chars, max 32)"
        );
    }
}
