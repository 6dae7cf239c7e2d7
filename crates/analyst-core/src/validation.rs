//! Input validation for analyst requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, Role};

/// Maximum number of entries in a conversation history.
pub const MAX_MESSAGES: usize = 100;

/// Maximum characters in a single message.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Maximum characters accepted by the title endpoint.
pub const MAX_TITLE_SOURCE_CHARS: usize = 500;

/// Maximum characters in a password attempt.
pub const MAX_PASSWORD_CHARS: usize = 128;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required value missing or blank.
    Empty { field: String },
    /// Value too long.
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },
    /// Too many entries in a list.
    TooMany {
        field: String,
        max: usize,
        actual: usize,
    },
    /// Role not one of system/user/assistant.
    InvalidRole { field: String, role: String },
}

impl ValidationError {
    /// Dotted path of the offending field, e.g. `messages.3.content`.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::TooMany { field, .. }
            | ValidationError::InvalidRole { field, .. } => field,
        }
    }

    /// Field-level detail for an error response body.
    pub fn issue(&self) -> FieldIssue {
        let message = match self {
            ValidationError::Empty { .. } => "Value is required".to_string(),
            ValidationError::TooLong { max, .. } => {
                format!("Must be at most {} characters", max)
            }
            ValidationError::TooMany { max, .. } => format!("At most {} entries allowed", max),
            ValidationError::InvalidRole { role, .. } => {
                format!("Invalid role '{}', expected user, assistant or system", role)
            }
        };

        FieldIssue {
            field: self.field().to_string(),
            message,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty { field } => write!(f, "{} cannot be empty", field),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::TooMany { field, max, actual } => {
                write!(f, "{} has too many entries ({}, max {})", field, actual, max)
            }
            ValidationError::InvalidRole { field, role } => {
                write!(f, "{} has invalid role '{}'", field, role)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// One field problem as reported to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// A history entry as it arrives over the wire, before role checking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Check a string field against a required, bounded length.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(())
}

/// Validate an already-typed conversation history.
pub fn validate_messages(messages: &[ChatMessage]) -> Result<(), ValidationError> {
    check_count(messages.len())?;

    for (idx, message) in messages.iter().enumerate() {
        validate_text(
            &format!("messages.{}.content", idx),
            &message.content,
            MAX_CONTENT_CHARS,
        )?;
    }

    Ok(())
}

/// Convert wire entries into typed messages, validating as we go.
pub fn parse_history(entries: Vec<RawMessage>) -> Result<Vec<ChatMessage>, ValidationError> {
    check_count(entries.len())?;

    let mut messages = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let role = entry
            .role
            .parse::<Role>()
            .map_err(|_| ValidationError::InvalidRole {
                field: format!("messages.{}.role", idx),
                role: entry.role.clone(),
            })?;

        validate_text(
            &format!("messages.{}.content", idx),
            &entry.content,
            MAX_CONTENT_CHARS,
        )?;

        messages.push(ChatMessage {
            role,
            content: entry.content,
        });
    }

    Ok(messages)
}

/// Validate the body of a title request.
pub fn validate_title_source(message: &str) -> Result<(), ValidationError> {
    validate_text("message", message, MAX_TITLE_SOURCE_CHARS)
}

/// Validate a password attempt.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    validate_text("password", password, MAX_PASSWORD_CHARS)
}

fn check_count(actual: usize) -> Result<(), ValidationError> {
    if actual == 0 {
        return Err(ValidationError::Empty {
            field: "messages".to_string(),
        });
    }

    if actual > MAX_MESSAGES {
        return Err(ValidationError::TooMany {
            field: "messages".to_string(),
            max: MAX_MESSAGES,
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(role: &str, content: &str) -> RawMessage {
        RawMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_history_count_boundaries() {
        let hundred: Vec<_> = (0..100).map(|_| raw("user", "hi")).collect();
        assert_eq!(parse_history(hundred).unwrap().len(), 100);

        let too_many: Vec<_> = (0..101).map(|_| raw("user", "hi")).collect();
        assert!(matches!(
            parse_history(too_many),
            Err(ValidationError::TooMany { actual: 101, .. })
        ));

        assert!(matches!(
            parse_history(Vec::new()),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_content_length_boundaries() {
        let exact = "a".repeat(MAX_CONTENT_CHARS);
        assert!(parse_history(vec![raw("user", &exact)]).is_ok());

        let over = "a".repeat(MAX_CONTENT_CHARS + 1);
        let err = parse_history(vec![raw("user", "ok"), raw("user", &over)]).unwrap_err();
        assert_eq!(err.field(), "messages.1.content");
        assert!(matches!(err, ValidationError::TooLong { actual: 10_001, .. }));
    }

    #[test]
    fn test_content_length_counts_chars_not_bytes() {
        let wide = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_messages(&[ChatMessage::user(wide)]).is_ok());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = parse_history(vec![raw("tool", "x")]).unwrap_err();
        assert_eq!(err.field(), "messages.0.role");
    }

    #[test]
    fn test_empty_content_rejected() {
        let err = parse_history(vec![raw("user", "")]).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn test_password_and_title_limits() {
        assert!(validate_password(&"p".repeat(128)).is_ok());
        assert!(validate_password(&"p".repeat(129)).is_err());
        assert!(validate_password("").is_err());
        assert!(validate_title_source(&"m".repeat(500)).is_ok());
        assert!(validate_title_source(&"m".repeat(501)).is_err());
    }

    #[test]
    fn test_issue_carries_field_path() {
        let issue = ValidationError::TooMany {
            field: "messages".to_string(),
            max: 100,
            actual: 101,
        }
        .issue();
        assert_eq!(issue.field, "messages");
        assert_eq!(issue.message, "At most 100 entries allowed");
    }
}
