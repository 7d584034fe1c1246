//! 时间源抽象：学习调度只通过 `Clock` 取当前时间，测试里可以手动拨钟。
use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

/// 时间源。
pub trait Clock {
    fn now(&self) -> Instant;
}

/// 系统单调时钟。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动时钟：克隆出来的句柄共享同一个时间点。
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Instant::now())
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(at: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    /// 拨快时钟。
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let t0 = clock.now();
        handle.advance(Duration::from_secs(61));
        assert_eq!(clock.now() - t0, Duration::from_secs(61));
    }
}
