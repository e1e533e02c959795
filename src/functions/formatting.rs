use chrono::{NaiveTime, TimeDelta, Timelike};

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Format a video timestamp as `MM:SS`, or `H:MM:SS` from one hour on.
/// Hours are not padded; lectures never need two digits there.
#[inline]
pub fn timestamp_to_string(timestamp_ms: u64) -> String {
    let offset = TimeDelta::milliseconds((timestamp_ms % MS_PER_DAY) as i64);
    let time = NaiveTime::MIN + offset;

    if time.hour() == 0 {
        time.format("%M:%S").to_string()
    } else {
        time.format("%-H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_under_an_hour() {
        assert_eq!(timestamp_to_string(0), "00:00");
        assert_eq!(timestamp_to_string(59_999), "00:59");
        assert_eq!(timestamp_to_string(61_000), "01:01");
        assert_eq!(timestamp_to_string(3_599_000), "59:59");
    }

    #[test]
    fn test_timestamp_with_hours() {
        assert_eq!(timestamp_to_string(3_600_000), "1:00:00");
        assert_eq!(timestamp_to_string(3_723_000), "1:02:03");
        assert_eq!(timestamp_to_string(11 * 3_600_000 + 5_000), "11:00:05");
    }
}
