use crate::models::{ChallengeDraft, HabitDraft, ProfileUpdate};
use std::collections::BTreeMap;

const HABIT_TITLE_MAX: usize = 100;
const COMMENT_MAX: usize = 500;
const BIO_MAX: usize = 500;
/// Largest avatar accepted for upload.
pub(crate) const AVATAR_MAX_BYTES: f64 = 5.0 * 1024.0 * 1024.0;

/// Field name -> human message. Rendered inline next to the offending input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn validate_required(value: &str, message: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(message.to_string())
    } else {
        None
    }
}

fn is_hex_color(s: &str) -> bool {
    let hex = s.strip_prefix('#').unwrap_or(s);
    (3..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn validate_habit(draft: &HabitDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    let title = draft.title.trim();

    if let Some(msg) = validate_required(title, "Please give your habit a title") {
        errors.insert("title", msg);
    } else if title.chars().count() < 2 {
        errors.insert("title", "Title should be at least 2 characters");
    } else if title.chars().count() > HABIT_TITLE_MAX {
        errors.insert("title", "Title must be 100 characters or less");
    }

    if !draft.color_code.is_empty() && !is_hex_color(&draft.color_code) {
        errors.insert("color_code", "Use a hex color like #3B82F6");
    }

    errors.into_result()
}

pub(crate) fn validate_challenge(draft: &ChallengeDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    if let Some(msg) = validate_required(&draft.title, "Please give your challenge a title") {
        errors.insert("title", msg);
    }

    let start = draft.start_date.trim();
    let end = draft.end_date.trim();
    if start.is_empty() {
        errors.insert("start_date", "Pick a start date");
    }
    if end.is_empty() {
        errors.insert("end_date", "Pick an end date");
    }
    if !start.is_empty() && !end.is_empty() {
        match super::days_between(start, end) {
            Some(d) if d < 0 => errors.insert("end_date", "End date must be after the start date"),
            None => errors.insert("end_date", "Use dates like 2024-05-01"),
            _ => {}
        }
    }

    errors.into_result()
}

pub(crate) fn validate_comment(text: &str) -> Result<String, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Write something first".to_string());
    }
    if text.chars().count() > COMMENT_MAX {
        return Err("Comments are limited to 500 characters".to_string());
    }
    Ok(text.to_string())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

pub(crate) fn validate_registration(form: &RegistrationForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    if form.username.trim().chars().count() < 3 {
        errors.insert("username", "Username must be at least 3 characters");
    }
    if !form.email.contains('@') {
        errors.insert("email", "Enter a valid email address");
    }
    if form.password.chars().count() < 8 {
        errors.insert("password", "Password must be at least 8 characters");
    }
    if form.password != form.password_confirm {
        errors.insert("password_confirm", "Passwords do not match");
    }

    errors.into_result()
}

pub(crate) fn validate_profile(update: &ProfileUpdate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    let email = update.email.trim();
    if !email.is_empty() && !email.contains('@') {
        errors.insert("email", "Enter a valid email address");
    }
    if update.bio.chars().count() > BIO_MAX {
        errors.insert("bio", "Bio is limited to 500 characters");
    }

    errors.into_result()
}

pub(crate) fn validate_avatar(mime: &str, size_bytes: f64) -> Result<(), String> {
    if !mime.starts_with("image/") {
        return Err("Please choose an image file".to_string());
    }
    if size_bytes > AVATAR_MAX_BYTES {
        return Err("Image must be smaller than 5MB".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> HabitDraft {
        HabitDraft {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_required_treats_whitespace_as_empty() {
        assert_eq!(validate_required("  ", "req").as_deref(), Some("req"));
        assert!(validate_required("x", "req").is_none());
    }

    #[test]
    fn test_habit_title_rules() {
        let errs = validate_habit(&draft("")).unwrap_err();
        assert_eq!(errs.get("title"), Some("Please give your habit a title"));

        let errs = validate_habit(&draft("a")).unwrap_err();
        assert_eq!(errs.get("title"), Some("Title should be at least 2 characters"));

        let errs = validate_habit(&draft(&"x".repeat(101))).unwrap_err();
        assert_eq!(errs.get("title"), Some("Title must be 100 characters or less"));

        assert!(validate_habit(&draft("Meditate")).is_ok());
    }

    #[test]
    fn test_habit_color_must_be_hex() {
        let mut d = draft("Stretch");
        d.color_code = "blue".to_string();
        let errs = validate_habit(&d).unwrap_err();
        assert!(errs.get("color_code").is_some());
        assert!(errs.get("title").is_none());

        d.color_code = "fff".to_string();
        assert!(validate_habit(&d).is_ok());
    }

    #[test]
    fn test_challenge_end_before_start() {
        let d = ChallengeDraft {
            title: "30 days".to_string(),
            start_date: "2024-05-10".to_string(),
            end_date: "2024-05-01".to_string(),
            ..Default::default()
        };
        let errs = validate_challenge(&d).unwrap_err();
        assert_eq!(errs.get("end_date"), Some("End date must be after the start date"));
    }

    #[test]
    fn test_comment_is_trimmed() {
        assert_eq!(validate_comment("  hi  ").as_deref(), Ok("hi"));
        assert!(validate_comment("   ").is_err());
    }

    #[test]
    fn test_registration_mismatch() {
        let form = RegistrationForm {
            username: "sam".to_string(),
            email: "sam@example.com".to_string(),
            password: "longenough".to_string(),
            password_confirm: "different!".to_string(),
        };
        let errs = validate_registration(&form).unwrap_err();
        assert_eq!(errs.get("password_confirm"), Some("Passwords do not match"));
        assert!(errs.get("username").is_none());
    }

    #[test]
    fn test_profile_email_optional_but_checked() {
        let mut update = ProfileUpdate::default();
        assert!(validate_profile(&update).is_ok());
        update.email = "nope".to_string();
        let errs = validate_profile(&update).unwrap_err();
        assert!(errs.get("email").is_some());
    }

    #[test]
    fn test_avatar_type_and_size() {
        assert!(validate_avatar("image/png", 1024.0).is_ok());
        assert!(validate_avatar("application/pdf", 1024.0).is_err());
        assert_eq!(
            validate_avatar("image/jpeg", AVATAR_MAX_BYTES + 1.0),
            Err("Image must be smaller than 5MB".to_string())
        );
    }
}
