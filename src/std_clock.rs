use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_timers::clock::Clock;

/// 标准时钟（单调时钟）
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl StdClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed(&self, instant: Self::Instant) -> Duration {
        instant.elapsed()
    }
}

/// 阻塞延时，挂起当前线程
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// 手动推进的时钟，用于仿真和测试
///
/// 克隆出来的实例共享同一个时间轴
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 时间向前推进
    pub fn advance(&self, duration: Duration) {
        self.offset_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// 从创建到现在经过的仿真时间
    pub fn uptime(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }

    /// 延时即推进本时钟的延时器
    pub fn delay(&self) -> ManualDelay {
        ManualDelay {
            clock: self.clone(),
            total: Duration::ZERO,
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        self.origin + self.uptime()
    }

    fn elapsed(&self, instant: Self::Instant) -> Duration {
        self.now().saturating_duration_since(instant)
    }
}

/// 不真正休眠，而是推进`ManualClock`
#[derive(Debug, Clone)]
pub struct ManualDelay {
    clock: ManualClock,
    total: Duration,
}

impl ManualDelay {
    /// 累计延时总长
    pub fn total(&self) -> Duration {
        self.total
    }
}

impl DelayNs for ManualDelay {
    fn delay_ns(&mut self, ns: u32) {
        let duration = Duration::from_nanos(ns as u64);
        self.total += duration;
        self.clock.advance(duration);
    }
}
