use chrono::{DateTime, Duration, Utc};

/// Time left before an action last performed at `last` may run again.
pub fn remaining(last: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: Duration) -> Option<Duration> {
    let elapsed = now - last?;
    (elapsed < cooldown).then(|| cooldown - elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_when_never_done() {
        assert_eq!(remaining(None, Utc::now(), Duration::minutes(5)), None);
    }

    #[test]
    fn reports_time_left() {
        let now = Utc::now();
        let last = now - Duration::seconds(60);
        assert_eq!(
            remaining(Some(last), now, Duration::minutes(5)),
            Some(Duration::seconds(240))
        );
    }

    #[test]
    fn ready_exactly_at_boundary() {
        let now = Utc::now();
        let cooldown = Duration::minutes(2);
        assert_eq!(remaining(Some(now - cooldown), now, cooldown), None);
    }
}
