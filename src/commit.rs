use std::time::{Duration, Instant};

/// Restartable single-shot deadline that marks a multi-stroke gesture as
/// finished once no new stroke has started within the delay window.
///
/// Time is injected by the caller, so tests control the clock. `fire_due`
/// consumes the deadline before reporting it, which gives the at-most-one
/// fire per commit cycle guarantee on the single task queue.
#[derive(Clone, Copy, Debug)]
pub struct CommitTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(1000);

impl CommitTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Cancels any pending fire and schedules a new one `delay` from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per scheduled cycle, at the first poll at or past
    /// the deadline.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for CommitTimer {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer_ms(ms: u64) -> CommitTimer {
        CommitTimer::new(Duration::from_millis(ms))
    }

    #[test]
    fn does_not_fire_before_the_deadline() {
        let start = Instant::now();
        let mut timer = timer_ms(100);
        timer.restart(start);

        assert!(!timer.fire_due(start));
        assert!(!timer.fire_due(start + Duration::from_millis(99)));
        assert!(timer.is_pending());
    }

    #[test]
    fn fires_exactly_once_per_cycle() {
        let start = Instant::now();
        let mut timer = timer_ms(100);
        timer.restart(start);

        let after = start + Duration::from_millis(100);
        assert!(timer.fire_due(after));
        assert!(!timer.fire_due(after));
        assert!(!timer.fire_due(after + Duration::from_secs(10)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn restart_pushes_the_deadline_out() {
        let start = Instant::now();
        let mut timer = timer_ms(100);

        // five restarts, each inside the previous window
        for i in 0..5u64 {
            timer.restart(start + Duration::from_millis(i * 50));
        }

        let last_restart = start + Duration::from_millis(200);
        assert!(!timer.fire_due(last_restart + Duration::from_millis(99)));
        assert!(timer.fire_due(last_restart + Duration::from_millis(100)));
        assert!(!timer.fire_due(last_restart + Duration::from_millis(200)));
    }

    #[test]
    fn cancel_suppresses_the_pending_fire() {
        let start = Instant::now();
        let mut timer = timer_ms(50);
        timer.restart(start);
        timer.cancel();

        assert!(!timer.is_pending());
        assert!(!timer.fire_due(start + Duration::from_secs(1)));
    }

    #[test]
    fn idle_timer_never_fires() {
        let mut timer = timer_ms(10);
        assert!(!timer.fire_due(Instant::now() + Duration::from_secs(60)));
    }

    #[test]
    fn restart_after_fire_schedules_a_new_cycle() {
        let start = Instant::now();
        let mut timer = timer_ms(100);
        timer.restart(start);
        assert!(timer.fire_due(start + Duration::from_millis(100)));

        timer.restart(start + Duration::from_millis(500));
        assert!(timer.is_pending());
        assert!(timer.fire_due(start + Duration::from_millis(600)));
    }
}
