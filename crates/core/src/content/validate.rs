/// Required-field validation for create and update operations.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid {0}: '{1}'")]
    InvalidField(&'static str, String),
}

/// Reject an empty or whitespace-only value for a required field.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Validate the fields every content item must carry.
pub fn validate_content_fields(
    title: &str,
    description: &str,
    poster_url: &str,
    background_url: &str,
) -> Result<(), ValidationError> {
    require("title", title)?;
    require("description", description)?;
    require("poster_url", poster_url)?;
    require("background_url", background_url)?;
    Ok(())
}

/// Blank links fall back to the column default.
pub fn link_or_default(link: Option<&str>) -> String {
    match link.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => "#".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank() {
        assert_eq!(require("name", ""), Err(ValidationError::MissingField("name")));
        assert_eq!(require("name", "   "), Err(ValidationError::MissingField("name")));
        assert!(require("name", "Action").is_ok());
    }

    #[test]
    fn content_fields_all_required() {
        assert!(validate_content_fields("t", "d", "p", "b").is_ok());
        let err = validate_content_fields("t", "d", "", "b").unwrap_err();
        assert_eq!(err, ValidationError::MissingField("poster_url"));
    }

    #[test]
    fn blank_link_defaults() {
        assert_eq!(link_or_default(None), "#");
        assert_eq!(link_or_default(Some("  ")), "#");
        assert_eq!(link_or_default(Some("/watch/42")), "/watch/42");
    }
}
