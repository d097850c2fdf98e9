use crate::helper::WorkflowError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Strips all HTML tags from input, keeping only the text content.
///
/// The result is plain text: ammonia's entity output is decoded again, and
/// ampersands are escaped first so entity-like text in the input survives.
/// Escaping for display happens at render time.
pub fn strip_all_html(input: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(&input.replace('&', "&amp;"))
        .to_string();
    html_escape::decode_html_entities(&cleaned).into_owned()
}

/// Trims and strips a free-text field.
pub fn clean_text(input: &str) -> String {
    strip_all_html(input.trim()).trim().to_string()
}

/// Cleans a mandatory field and checks its length in characters.
pub fn required_text(field: &str, input: &str, min: usize, max: usize) -> Result<String, WorkflowError> {
    let value = clean_text(input);
    let len = value.chars().count();
    if value.is_empty() {
        return Err(WorkflowError::InvalidInput(format!("{} is required", field)));
    }
    if len < min || len > max {
        return Err(WorkflowError::InvalidInput(format!(
            "{} must be between {} and {} characters", field, min, max
        )));
    }
    Ok(value)
}

/// Cleans an optional field. Blank values become `None`.
pub fn optional_text(field: &str, input: Option<&str>, max: usize) -> Result<Option<String>, WorkflowError> {
    let value = match input.map(clean_text) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };
    if value.chars().count() > max {
        return Err(WorkflowError::InvalidInput(format!(
            "{} must not exceed {} characters", field, max
        )));
    }
    Ok(Some(value))
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is valid")
    })
}

pub fn required_email(field: &str, input: &str, max: usize) -> Result<String, WorkflowError> {
    let value = clean_text(input);
    if value.is_empty() {
        return Err(WorkflowError::InvalidInput(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(WorkflowError::InvalidInput(format!(
            "{} must not exceed {} characters", field, max
        )));
    }
    if !email_regex().is_match(&value) {
        return Err(WorkflowError::InvalidInput(format!("{} is not a valid email address", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_removed_before_length_checks() {
        assert_eq!(clean_text("  <b>Alice</b> Martin "), "Alice Martin");
        assert!(required_text("full_name", "<script>x</script>", 2, 100).is_err());
        assert_eq!(required_text("full_name", "<i>Bo</i>", 2, 100).unwrap(), "Bo");
    }

    #[test]
    fn plain_text_punctuation_is_kept_verbatim() {
        assert_eq!(clean_text("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(clean_text("Is 3 < 5 & 5 > 3 true?"), "Is 3 < 5 & 5 > 3 true?");
        assert_eq!(clean_text("Q&A \"session\" l'été"), "Q&A \"session\" l'été");
        assert_eq!(clean_text("literal &amp; stays"), "literal &amp; stays");
    }

    #[test]
    fn ampersands_do_not_inflate_lengths() {
        let body = "&".repeat(1000);
        assert_eq!(required_text("body", &body, 10, 1000).unwrap(), body);
    }

    #[test]
    fn length_bounds_count_characters() {
        assert!(required_text("subject", "Été!", 5, 150).is_err());
        assert_eq!(required_text("subject", "Été !", 5, 150).unwrap(), "Été !");
        assert!(required_text("subject", &"a".repeat(151), 5, 150).is_err());
    }

    #[test]
    fn blank_optional_fields_are_absent() {
        assert_eq!(optional_text("message", Some("   "), 500).unwrap(), None);
        assert_eq!(optional_text("message", None, 500).unwrap(), None);
        assert_eq!(optional_text("message", Some(" hi "), 500).unwrap().as_deref(), Some("hi"));
        assert!(optional_text("message", Some(&"a".repeat(501)), 500).is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        assert_eq!(required_email("email", " alice@example.org ", 150).unwrap(), "alice@example.org");
        for bad in ["", "alice", "alice@", "@example.org", "alice@example", "a b@example.org"] {
            assert!(required_email("email", bad, 150).is_err(), "accepted {:?}", bad);
        }
    }
}
