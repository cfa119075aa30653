mod dates;
mod format;
mod validation;

pub(crate) use dates::{days_between, days_left, format_iso_date, format_short, relative_time};
pub(crate) use format::{clamp, format_number, format_percent};
pub(crate) use validation::{
    validate_avatar, validate_challenge, validate_comment, validate_habit, validate_profile,
    validate_registration, FieldErrors, RegistrationForm,
};

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Local ids for optimistic rows; the server id replaces them on success.
pub(crate) fn make_tmp_id(now_ms: i64, rand: u64) -> String {
    format!("tmp-{now_ms}-{rand}")
}

pub(crate) fn is_tmp_id(id: &str) -> bool {
    id.starts_with("tmp-")
}

pub(crate) fn random_u64() -> u64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return 0;
    }
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_ids_are_recognized() {
        let id = make_tmp_id(1_700_000_000_000, 42);
        assert_eq!(id, "tmp-1700000000000-42");
        assert!(is_tmp_id(&id));
        assert!(!is_tmp_id("17"));
    }
}
