//! Form field validators.
//!
//! Each validator returns `Ok(())` or the message to show under the field.
//! Optional fields (`email`, `url`) accept an empty value; combine them with
//! [`required`] when the field is mandatory.

use std::sync::LazyLock;

use regex::Regex;

pub type Validation = Result<(), String>;

const PASSWORD_SPECIALS: &str = "!@#$%&*()";

fn compiled(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| tracing::error!("Invalid validator pattern {pattern}: {e}"))
        .ok()
}

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| compiled(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static INTEGER: LazyLock<Option<Regex>> = LazyLock::new(|| compiled(r"^-?\d+$"));
static URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| compiled(r"^(https?://)?(www\.)?[a-zA-Z0-9.-]+\.[a-zA-Z]{2,5}"));
static ALPHA: LazyLock<Option<Regex>> = LazyLock::new(|| compiled(r"^[A-Za-z]*$"));

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

fn check(ok: bool, message: impl Into<String>) -> Validation {
    if ok {
        Ok(())
    } else {
        Err(message.into())
    }
}

pub fn is_empty(value: &str) -> bool {
    value.is_empty()
}

pub fn required(value: &str) -> Validation {
    check(!value.trim().is_empty(), "This field is required")
}

pub fn email(value: &str) -> Validation {
    if is_empty(value) {
        return Ok(());
    }
    check(
        matches(&EMAIL, value),
        "The Email field must be a valid email address",
    )
}

/// At least 8 characters with an uppercase letter, a lowercase letter, a digit
/// and one of `!@#$%&*()`.
pub fn password(value: &str) -> Validation {
    let ok = value.chars().count() >= 8
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    check(
        ok,
        "Password must include uppercase, lowercase, number, and special character, with at least 8 characters",
    )
}

pub fn confirm_password(value: &str, target: &str) -> Validation {
    check(value == target, "The passwords do not match")
}

pub fn between(value: &str, min: f64, max: f64) -> Validation {
    let ok = value
        .trim()
        .parse::<f64>()
        .is_ok_and(|n| n >= min && n <= max);
    check(ok, format!("Enter a number between {min} and {max}"))
}

pub fn integer(value: &str) -> Validation {
    check(matches(&INTEGER, value), "This field must be an integer")
}

pub fn url(value: &str) -> Validation {
    if is_empty(value) {
        return Ok(());
    }
    check(matches(&URL, value), "URL is invalid")
}

pub fn alpha(value: &str) -> Validation {
    check(
        matches(&ALPHA, value),
        "This field may only contain alphabetic characters",
    )
}

pub fn length(value: &str, min_length: usize) -> Validation {
    check(
        value.chars().count() >= min_length,
        format!("This field must be at least {min_length} characters long"),
    )
}

/// Match `value` against a caller-supplied pattern. An invalid pattern never
/// matches.
pub fn regex(value: &str, pattern: &str) -> Validation {
    let ok = Regex::new(pattern).is_ok_and(|re| re.is_match(value));
    check(ok, "Your input doesn't match the expected format")
}
