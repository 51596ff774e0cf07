//! Client-side form validation. Everything here runs before a request is
//! built; a failure never reaches the network.

use chrono::NaiveDate;

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_PHOTO_MIMES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MAX_BIO_LEN: usize = 500;
const MAX_NOTE_LEN: usize = 1000;
const MIN_TITLE_LEN: usize = 3;
const MAX_TITLE_LEN: usize = 200;

pub fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", label))
    } else {
        Ok(())
    }
}

pub fn email(value: &str) -> Result<(), String> {
    required(value, "Email")?;
    let trimmed = value.trim();
    // Shape check only; the backend is the authority.
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => Ok(()),
        _ => Err("Email address is not valid".to_string()),
    }
}

pub fn password(value: &str) -> Result<(), String> {
    if value.len() < MIN_PASSWORD_LEN {
        Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN))
    } else {
        Ok(())
    }
}

pub fn password_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password == confirmation {
        Ok(())
    } else {
        Err("Password confirmation does not match".to_string())
    }
}

pub fn username(value: &str) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < MIN_USERNAME_LEN || len > MAX_USERNAME_LEN {
        Err(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LEN, MAX_USERNAME_LEN
        ))
    } else {
        Ok(())
    }
}

pub fn bio(value: &str) -> Result<(), String> {
    if value.chars().count() > MAX_BIO_LEN {
        Err(format!("Bio must be at most {} characters", MAX_BIO_LEN))
    } else {
        Ok(())
    }
}

pub fn note(value: &str) -> Result<(), String> {
    if value.chars().count() > MAX_NOTE_LEN {
        Err(format!("Note must be at most {} characters", MAX_NOTE_LEN))
    } else {
        Ok(())
    }
}

fn title(value: &str, label: &str) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < MIN_TITLE_LEN || len > MAX_TITLE_LEN {
        Err(format!(
            "{} must be between {} and {} characters",
            label, MIN_TITLE_LEN, MAX_TITLE_LEN
        ))
    } else {
        Ok(())
    }
}

pub fn activity_title(value: &str) -> Result<(), String> {
    title(value, "Activity title")
}

pub fn habit_title(value: &str) -> Result<(), String> {
    title(value, "Habit title")
}

pub fn duration_mins(value: i64) -> Result<(), String> {
    if value < 1 {
        Err("Duration must be at least 1 minute".to_string())
    } else {
        Ok(())
    }
}

pub fn date(value: &str, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD form", label))
}

/// End date must come strictly after the start date.
pub fn habit_dates(start: &str, end: &str) -> Result<(), String> {
    let start = date(start, "Start date")?;
    let end = date(end, "End date")?;
    if end <= start {
        Err("End date must be after the start date".to_string())
    } else {
        Ok(())
    }
}

/// Accepts "YYYY-MM-DDTHH:MM" (what the form produces) with optional
/// seconds and optional trailing "Z".
pub fn start_time(value: &str) -> Result<(), String> {
    let trimmed = value.trim().trim_end_matches('Z');
    let formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    if formats
        .iter()
        .any(|f| chrono::NaiveDateTime::parse_from_str(trimmed, f).is_ok())
    {
        Ok(())
    } else {
        Err("Start time must look like 2025-01-01T06:00".to_string())
    }
}

pub fn photo(size: usize, mime: &str) -> Result<(), String> {
    if size > MAX_PHOTO_BYTES {
        return Err("Photo must be 5 MB or smaller".to_string());
    }
    if !ALLOWED_PHOTO_MIMES.contains(&mime) {
        return Err("Photo must be a JPEG, PNG or WebP image".to_string());
    }
    Ok(())
}

/// MIME type for an image path based on its extension, for upload parts.
pub fn image_mime_for(path: &std::path::Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn end_date_on_or_before_start_is_rejected() {
        assert!(habit_dates("2025-03-01", "2025-03-01").is_err());
        assert!(habit_dates("2025-03-02", "2025-03-01").is_err());
        assert!(habit_dates("2025-03-01", "2025-03-31").is_ok());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(habit_dates("tomorrow", "2025-03-31").is_err());
        assert!(habit_dates("2025-03-01", "31/03/2025").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("user@example.com").is_ok());
        assert!(email("").is_err());
        assert!(email("no-at-sign").is_err());
        assert!(email("user@nodot").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(password("short").is_err());
        assert!(password("longenough").is_ok());
        assert!(password_confirmation("abcdef", "abcdef").is_ok());
        assert!(password_confirmation("abcdef", "abcdeg").is_err());
    }

    #[test]
    fn username_bounds() {
        assert!(username("ab").is_err());
        assert!(username("abc").is_ok());
        assert!(username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn photo_ceiling_and_allowlist() {
        assert!(photo(MAX_PHOTO_BYTES, "image/png").is_ok());
        assert!(photo(MAX_PHOTO_BYTES + 1, "image/png").is_err());
        assert!(photo(1024, "image/gif").is_err());
        assert!(photo(1024, "image/webp").is_ok());
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(image_mime_for(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_for(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(image_mime_for(Path::new("a.bmp")), None);
        assert_eq!(image_mime_for(Path::new("noext")), None);
    }

    #[test]
    fn start_time_shapes() {
        assert!(start_time("2025-01-01T06:00").is_ok());
        assert!(start_time("2025-01-01T06:00:00Z").is_ok());
        assert!(start_time("2025-01-01").is_err());
        assert!(start_time("six in the morning").is_err());
    }

    #[test]
    fn required_and_titles() {
        assert!(required("  ", "Title").is_err());
        assert!(activity_title("Go").is_err());
        assert!(activity_title("Run").is_ok());
        assert!(duration_mins(0).is_err());
        assert!(duration_mins(30).is_ok());
    }
}
