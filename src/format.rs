use chrono::Duration;

/// `3h 4m 5s`, always with every unit.
pub fn hms(seconds: u64) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    format!("{}h {}m {}s", hours, rest / 60, rest % 60)
}

/// `03:04:05`, used in the rotating status line.
pub fn clock(seconds: u64) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    format!("{:02}:{:02}:{:02}", hours, rest / 60, rest % 60)
}

/// Drops leading zero units: `45s`, `4m 0s`, `2h 0m 10s`.
pub fn compact(seconds: u64) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    let (minutes, secs) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

pub fn remaining(duration: &Duration) -> String {
    compact(duration.num_seconds().max(0) as u64)
}

pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn progress_bar(done: u64, total: u64, length: usize) -> String {
    let filled = if total == 0 {
        length
    } else {
        ((done.min(total) as f64 / total as f64) * length as f64) as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(length - filled))
}

pub fn discord_timestamp(time: i64, style: TimestampStyle) -> String {
    format!("<t:{}:{}>", time, style.as_str())
}

pub enum TimestampStyle {
    /// `d`, as in 06/09/2023.
    ShortDate,
    /// `F`, as in Friday, June 9, 2023 9:41 PM.
    LongDateTime,
    /// `R`, as in 2 months ago.
    Relative,
}

impl TimestampStyle {
    fn as_str(&self) -> &'static str {
        match self {
            Self::ShortDate => "d",
            Self::LongDateTime => "F",
            Self::Relative => "R",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formats() {
        assert_eq!(hms(3725), "1h 2m 5s");
        assert_eq!(clock(3725), "01:02:05");
        assert_eq!(compact(45), "45s");
        assert_eq!(compact(240), "4m 0s");
        assert_eq!(compact(7210), "2h 0m 10s");
        assert_eq!(remaining(&Duration::seconds(-3)), "0s");
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(progress_bar(5, 10, 4), "██░░");
        assert_eq!(progress_bar(50, 10, 4), "████");
        assert_eq!(progress_bar(0, 10, 4), "░░░░");
    }

    #[test]
    fn timestamp_markup() {
        assert_eq!(discord_timestamp(10, TimestampStyle::Relative), "<t:10:R>");
        assert_eq!(discord_timestamp(10, TimestampStyle::ShortDate), "<t:10:d>");
        assert_eq!(discord_timestamp(10, TimestampStyle::LongDateTime), "<t:10:F>");
    }
}
