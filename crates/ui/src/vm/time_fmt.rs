use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Countdown label, `MM:SS`; `--:--` before the timer starts.
#[must_use]
pub fn format_clock(remaining_secs: Option<u32>) -> String {
    match remaining_secs {
        Some(secs) => format!("{:02}:{:02}", secs / 60, secs % 60),
        None => "--:--".to_string(),
    }
}

/// `1m 05s`, or `42s` under a minute. `N/A` when nothing was timed.
#[must_use]
pub fn format_duration(secs: Option<u32>) -> String {
    match secs {
        None => "N/A".to_string(),
        Some(secs) if secs < 60 => format!("{secs}s"),
        Some(secs) => format!("{}m {:02}s", secs / 60, secs % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::time::fixed_now;

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(Some(1800)), "30:00");
        assert_eq!(format_clock(Some(65)), "01:05");
        assert_eq!(format_clock(Some(0)), "00:00");
        assert_eq!(format_clock(None), "--:--");
    }

    #[test]
    fn durations_switch_to_minutes_at_sixty() {
        assert_eq!(format_duration(Some(42)), "42s");
        assert_eq!(format_duration(Some(60)), "1m 00s");
        assert_eq!(format_duration(Some(125)), "2m 05s");
        assert_eq!(format_duration(None), "N/A");
    }

    #[test]
    fn datetime_is_minute_precision() {
        // 1_700_000_000 is 2023-11-14 22:13:20 UTC.
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13");
    }
}
