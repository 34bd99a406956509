const BASE_LEVEL_XP: u64 = 100;

fn next_span(span: u64) -> u64 {
    span * 3 / 2
}

/// Level reached with `xp` total experience. Level 1 needs 100 XP to leave,
/// every later level needs 50% more than the previous one.
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    let mut span = BASE_LEVEL_XP;
    let mut remaining = xp;
    while remaining >= span {
        remaining -= span;
        level += 1;
        span = next_span(span);
    }
    level
}

/// Total XP needed to reach `level`.
pub fn xp_for_level(level: u32) -> u64 {
    let mut total = 0;
    let mut span = BASE_LEVEL_XP;
    for _ in 1..level {
        total += span;
        span = next_span(span);
    }
    total
}

/// XP span of `level`, i.e. what it takes to go from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32) -> u64 {
    let mut span = BASE_LEVEL_XP;
    for _ in 1..level {
        span = next_span(span);
    }
    span
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: u32,
    pub into_level: u64,
    pub span: u64,
}

impl Progress {
    pub fn percent(&self) -> u64 {
        self.into_level * 100 / self.span
    }
}

pub fn progress(xp: u64) -> Progress {
    let level = level_for_xp(xp);
    Progress {
        level,
        into_level: xp - xp_for_level(level),
        span: xp_for_next_level(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_matches_geometric_steps() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(475), 4);
    }

    #[test]
    fn spans_floor_each_step() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(2), 150);
        assert_eq!(xp_for_next_level(3), 225);
        assert_eq!(xp_for_next_level(4), 337);
        assert_eq!(xp_for_next_level(5), 505);
    }

    #[test]
    fn level_thresholds_are_consistent() {
        for level in 1..30 {
            let start = xp_for_level(level);
            assert_eq!(level_for_xp(start), level);
            assert_eq!(xp_for_level(level + 1) - start, xp_for_next_level(level));
        }
    }

    #[test]
    fn progress_within_level() {
        let p = progress(175);
        assert_eq!(p, Progress { level: 2, into_level: 75, span: 150 });
        assert_eq!(p.percent(), 50);
    }
}
