use std::time::Duration;

use embedded_timers::clock::Clock;

/// 累计开启时间
///
/// 每次更新只计入整秒，不足一秒的部分留到下一次更新
#[derive(Debug, Clone)]
pub struct OnTimeTracker<I> {
    since: Option<I>,
    carry: Duration,
    total_seconds: f64,
}

impl<I: Copy> Default for OnTimeTracker<I> {
    fn default() -> Self {
        Self {
            since: None,
            carry: Duration::ZERO,
            total_seconds: 0.0,
        }
    }
}

impl<I: Copy> OnTimeTracker<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始计时，已经在计时则不做任何事
    pub fn start<C>(&mut self, clock: &C)
    where
        C: Clock<Instant = I>,
    {
        if self.since.is_none() {
            self.since = Some(clock.now());
            self.carry = Duration::ZERO;
        }
    }

    /// 把上次更新以来的整秒数计入总时长
    pub fn update<C>(&mut self, clock: &C)
    where
        C: Clock<Instant = I>,
    {
        if let Some(since) = self.since {
            let elapsed = clock.elapsed(since) + self.carry;
            let whole = elapsed.as_secs();
            self.total_seconds += whole as f64;
            self.carry = elapsed - Duration::from_secs(whole);
            self.since = Some(clock.now());
        }
    }

    /// 结束计时，剩余不足一秒的部分丢弃
    pub fn stop<C>(&mut self, clock: &C)
    where
        C: Clock<Instant = I>,
    {
        self.update(clock);
        self.since = None;
        self.carry = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.since.is_some()
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::std_clock::ManualClock;
    use std::time::Instant;

    #[test]
    fn counts_whole_seconds_and_carries_remainder() {
        let clock = ManualClock::new();
        let mut tracker: OnTimeTracker<Instant> = OnTimeTracker::new();
        tracker.start(&clock);

        clock.advance(Duration::from_millis(1500));
        tracker.update(&clock);
        assert_eq!(tracker.total_seconds(), 1.0);

        clock.advance(Duration::from_millis(600));
        tracker.update(&clock);
        assert_eq!(tracker.total_seconds(), 2.0);
    }

    #[test]
    fn does_not_grow_while_stopped() {
        let clock = ManualClock::new();
        let mut tracker: OnTimeTracker<Instant> = OnTimeTracker::new();
        tracker.start(&clock);
        clock.advance(Duration::from_secs(3));
        tracker.stop(&clock);
        assert!(!tracker.is_running());

        clock.advance(Duration::from_secs(10));
        tracker.update(&clock);
        assert_eq!(tracker.total_seconds(), 3.0);
    }
}
