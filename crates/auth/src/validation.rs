use lazy_static::lazy_static;
use regex::Regex;
use shop_error::{AppError, AppResult};

lazy_static! {
    // Email validation regex
    // This pattern checks for a valid email format with proper domain
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,6})$"
    ).unwrap();

    // Script-tag-like markup in the email field is treated as an injection
    // attempt, not merely a syntax error.
    static ref SCRIPT_TAG_REGEX: Regex = Regex::new(
        r"(?is)<script[^>]*>.*?</script>"
    ).unwrap();
}

/// The special characters a password must draw from.
const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// Accept a syntactically valid email that carries no script-tag markup.
/// Both failure modes report the same reason.
pub fn validate_email(email: &str) -> AppResult<()> {
    if SCRIPT_TAG_REGEX.is_match(email) || !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid or malicious email".to_string(),
        ));
    }

    Ok(())
}

/// A password is acceptable only when it is at least 8 characters and
/// contains a lowercase letter, an uppercase letter, a digit, and one of
/// `!@#$%^&*`.
pub fn validate_password_strength(password: &str) -> AppResult<()> {
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if password.len() < 8 || !has_lowercase || !has_uppercase || !has_digit || !has_special {
        return Err(AppError::ValidationError("Password is too weak".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(result: AppResult<()>) -> String {
        match result {
            Err(AppError::ValidationError(msg)) => msg,
            other => panic!("Expected a validation rejection, got {:?}", other.err()),
        }
    }

    #[test]
    fn accepts_plain_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["", "not-an-email", "user@", "@example.com", "user@example"] {
            assert_eq!(rejection(validate_email(email)), "Invalid or malicious email");
        }
    }

    #[test]
    fn rejects_script_tag_email_regardless_of_shape() {
        for email in [
            "<script>alert(1)</script>",
            "<SCRIPT src=x></SCRIPT>",
            "user@example.com<script>steal()</script>",
        ] {
            assert_eq!(rejection(validate_email(email)), "Invalid or malicious email");
        }
    }

    #[test]
    fn accepts_strong_password() {
        assert!(validate_password_strength("StrongP@ss1").is_ok());
        assert!(validate_password_strength("xY3!xY3!").is_ok());
    }

    #[test]
    fn rejects_each_missing_requirement() {
        // too short, no upper, no lower, no digit, no special
        for password in ["Sh0rt!a", "weakp@ss1", "WEAKP@SS1", "Weakp@ss", "Weakpass1"] {
            assert_eq!(
                rejection(validate_password_strength(password)),
                "Password is too weak"
            );
        }
    }

    #[test]
    fn special_set_is_the_fixed_one() {
        // '?' is not in the accepted special set
        assert!(validate_password_strength("Strong?Pass1").is_err());
        assert!(validate_password_strength("Strong*Pass1").is_ok());
    }
}
