use chrono::{DateTime, Datelike, NaiveDate};

/// Date layouts accepted for a disclosed date of birth.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Compute whole years from DOB to `today`.
///
/// One year is subtracted when today's month/day precedes the birth
/// month/day. Returns `None` for a birth date after `today`.
pub fn compute_age(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut age = i64::from(today.year()) - i64::from(dob.year());
    if today.month() < dob.month() || (today.month() == dob.month() && today.day() < dob.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Parse a disclosed date of birth.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
