use chrono::{DateTime, Utc};

/// Receipt and submission timestamps shown to the student.
#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    #[test]
    fn renders_minute_precision() {
        assert_eq!(format_datetime(fixed_now()), "2025-06-15 08:00 UTC");
    }
}
