use std::time::Duration;

use embedded_hal::digital::OutputPin;
use embedded_timers::clock::Clock;
use tracing::info;

use super::switches::ModeSelector;
use super::tracking::OnTimeTracker;
use crate::config::HeaterConfig;
use crate::error::Result;
use crate::event_log::{EventLog, system};
use crate::rtc::DateTime;
use crate::sensor::switch;

/// 加热器工作模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterMode {
    Auto,
    Off,
    On,
    /// 传感器不可用时按昼夜占空比循环加热
    Safe,
}

impl HeaterMode {
    pub fn name(self) -> &'static str {
        match self {
            HeaterMode::Auto => "AUTO",
            HeaterMode::Off => "OFF",
            HeaterMode::On => "ON",
            HeaterMode::Safe => "SAFE",
        }
    }
}

impl From<ModeSelector> for HeaterMode {
    fn from(value: ModeSelector) -> Self {
        match value {
            ModeSelector::Auto => HeaterMode::Auto,
            ModeSelector::Off => HeaterMode::Off,
            ModeSelector::On => HeaterMode::On,
        }
    }
}

/// 安全模式的开、关时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    pub on: Duration,
    pub off: Duration,
}

impl DutyCycle {
    /// 当前继电器状态需要保持的时长
    pub fn threshold(&self, heating: bool) -> Duration {
        if heating { self.on } else { self.off }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterSettings {
    pub min_temp_c: f32,
    pub max_temp_c: f32,
    pub night: DutyCycle,
    pub day: DutyCycle,
}

impl Default for HeaterSettings {
    fn default() -> Self {
        Self::from(&HeaterConfig::default())
    }
}

impl From<&HeaterConfig> for HeaterSettings {
    fn from(config: &HeaterConfig) -> Self {
        Self {
            min_temp_c: config.min_temp_c,
            max_temp_c: config.max_temp_c,
            night: DutyCycle {
                on: Duration::from_millis(config.night_on_ms),
                off: Duration::from_millis(config.night_off_ms),
            },
            day: DutyCycle {
                on: Duration::from_millis(config.day_on_ms),
                off: Duration::from_millis(config.day_off_ms),
            },
        }
    }
}

impl HeaterSettings {
    /// 上下限中点取整
    pub fn default_setpoint(&self) -> f32 {
        ((self.min_temp_c + self.max_temp_c) / 2.0).floor()
    }
}

/// 安全模式计时
#[derive(Debug, Clone, Copy)]
struct SafeSchedule<I> {
    timer: Duration,
    checked_at: Option<I>,
}

/// 加热器状态机
///
/// 继电器只在状态真正变化时写针脚、切换计时并写事件日志
pub struct HeaterController<R, I> {
    relay: switch::Driver<R>,
    settings: HeaterSettings,
    mode: HeaterMode,
    /// 进入安全模式前的模式，退出时开关都无效则恢复
    resume: HeaterMode,
    setpoint_c: f32,
    tracker: OnTimeTracker<I>,
    safe: SafeSchedule<I>,
}

impl<R: OutputPin, I: Copy> HeaterController<R, I> {
    pub fn new(relay: switch::Driver<R>, settings: HeaterSettings) -> Self {
        Self {
            relay,
            settings,
            mode: HeaterMode::Off,
            resume: HeaterMode::Off,
            setpoint_c: settings.default_setpoint(),
            tracker: OnTimeTracker::new(),
            safe: SafeSchedule {
                timer: Duration::ZERO,
                checked_at: None,
            },
        }
    }

    pub fn mode(&self) -> HeaterMode {
        self.mode
    }

    pub fn settings(&self) -> &HeaterSettings {
        &self.settings
    }

    pub fn setpoint_c(&self) -> f32 {
        self.setpoint_c
    }

    /// 设定温度，超出上下限时取边界值
    pub fn set_setpoint(&mut self, celsius: f32) {
        self.setpoint_c = celsius.clamp(self.settings.min_temp_c, self.settings.max_temp_c);
    }

    pub fn is_on(&self) -> bool {
        self.relay.is_on()
    }

    pub fn total_on_seconds(&self) -> f64 {
        self.tracker.total_seconds()
    }

    pub fn safe_timer(&self) -> Duration {
        self.safe.timer
    }

    /// 根据模式开关设置模式，安全模式下忽略开关
    pub fn apply_switches(&mut self, selected: Option<ModeSelector>) {
        if self.mode == HeaterMode::Safe {
            return;
        }
        if let Some(selected) = selected {
            self.mode = selected.into();
        }
    }

    /// 进入安全模式，返回是否是新进入
    pub fn enter_safe_mode<C>(&mut self, clock: &C) -> bool
    where
        C: Clock<Instant = I>,
    {
        if self.mode == HeaterMode::Safe {
            return false;
        }
        info!(from = self.mode.name(), "heater entering safe mode");
        self.resume = self.mode;
        self.mode = HeaterMode::Safe;
        self.safe = SafeSchedule {
            timer: Duration::ZERO,
            checked_at: Some(clock.now()),
        };
        true
    }

    /// 传感器恢复后退出安全模式，交回给模式开关
    pub fn clear_safe_mode(&mut self, selected: Option<ModeSelector>) -> bool {
        if self.mode != HeaterMode::Safe {
            return false;
        }
        self.mode = selected.map(HeaterMode::from).unwrap_or(self.resume);
        self.safe.checked_at = None;
        info!(to = self.mode.name(), "heater left safe mode");
        true
    }

    /// 每个周期调用一次，按当前模式决定继电器状态
    ///
    /// - `temperature_c`: 最近一次有效温度，还没有读数时为None
    pub fn evaluate<C, L>(
        &mut self,
        temperature_c: Option<f32>,
        at: &DateTime,
        clock: &C,
        log: &mut L,
    ) -> Result<()>
    where
        C: Clock<Instant = I>,
        L: EventLog,
    {
        self.tracker.update(clock);
        match self.mode {
            HeaterMode::Auto => match temperature_c {
                Some(t) if self.setpoint_c > t => self.turn_on(at, clock, log)?,
                _ => self.turn_off(at, clock, log)?,
            },
            HeaterMode::On => match temperature_c {
                Some(t) if t < self.settings.max_temp_c => self.turn_on(at, clock, log)?,
                _ => self.turn_off(at, clock, log)?,
            },
            HeaterMode::Off => self.turn_off(at, clock, log)?,
            HeaterMode::Safe => self.run_safe_cycle(at, clock, log)?,
        };
        Ok(())
    }

    /// 打开加热器，已打开时什么都不做，返回是否真的打开了
    pub fn turn_on<C, L>(&mut self, at: &DateTime, clock: &C, log: &mut L) -> Result<bool>
    where
        C: Clock<Instant = I>,
        L: EventLog,
    {
        if !self.relay.on()? {
            return Ok(false);
        }
        self.tracker.start(clock);
        self.record(true, at, log);
        Ok(true)
    }

    /// 关闭加热器，已关闭时什么都不做，返回是否真的关闭了
    pub fn turn_off<C, L>(&mut self, at: &DateTime, clock: &C, log: &mut L) -> Result<bool>
    where
        C: Clock<Instant = I>,
        L: EventLog,
    {
        if !self.relay.off()? {
            return Ok(false);
        }
        self.tracker.stop(clock);
        self.record(false, at, log);
        Ok(true)
    }

    /// 安全模式占空比：计时累加上次检查以来的时间，超过当前状态的时长后清零并切换
    pub fn run_safe_cycle<C, L>(&mut self, at: &DateTime, clock: &C, log: &mut L) -> Result<bool>
    where
        C: Clock<Instant = I>,
        L: EventLog,
    {
        if let Some(checked_at) = self.safe.checked_at {
            self.safe.timer += clock.elapsed(checked_at);
        }
        self.safe.checked_at = Some(clock.now());

        let cycle = if at.is_night() {
            self.settings.night
        } else {
            self.settings.day
        };
        if self.safe.timer <= cycle.threshold(self.is_on()) {
            return Ok(false);
        }
        self.safe.timer = Duration::ZERO;
        if self.is_on() {
            self.turn_off(at, clock, log)
        } else {
            self.turn_on(at, clock, log)
        }
    }

    fn record<L: EventLog>(&self, on: bool, at: &DateTime, log: &mut L) {
        let action = if on { "ON" } else { "OFF" };
        let total = self.tracker.total_seconds();
        info!(mode = self.mode.name(), action, total, "heater switched");
        log.log(
            system::HEATER,
            *at,
            format!("{}#{}#{:.2}", self.mode.name(), action, total),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::MemoryLog;
    use crate::std_clock::ManualClock;
    use embedded_hal::digital::PinState;
    use std::convert::Infallible;
    use std::time::Instant;

    struct Pin;

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> std::result::Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> std::result::Result<(), Infallible> {
            Ok(())
        }
    }

    fn heater() -> HeaterController<Pin, Instant> {
        let relay = switch::Driver::new(Pin, PinState::High).unwrap();
        HeaterController::new(relay, HeaterSettings::default())
    }

    #[test]
    fn default_setpoint_is_truncated_midpoint() {
        assert_eq!(heater().setpoint_c(), 26.0);
    }

    #[test]
    fn setpoint_is_clamped() {
        let mut heater = heater();
        heater.set_setpoint(40.0);
        assert_eq!(heater.setpoint_c(), 30.0);
        heater.set_setpoint(10.0);
        assert_eq!(heater.setpoint_c(), 23.0);
    }

    #[test]
    fn no_reading_keeps_relay_off() {
        let clock = ManualClock::new();
        let mut log = MemoryLog::new();
        let at = DateTime::new(1, 1, 2024, 12, 0, 0);
        let mut heater = heater();
        for selected in [ModeSelector::Auto, ModeSelector::On] {
            heater.apply_switches(Some(selected));
            heater.evaluate(None, &at, &clock, &mut log).unwrap();
            assert!(!heater.is_on());
        }
        assert!(log.records().is_empty());
    }

    #[test]
    fn leaving_safe_mode_without_switches_resumes_previous_mode() {
        let clock = ManualClock::new();
        let mut heater = heater();
        heater.apply_switches(Some(ModeSelector::Auto));
        assert!(heater.enter_safe_mode(&clock));
        assert!(!heater.enter_safe_mode(&clock));
        assert!(heater.clear_safe_mode(None));
        assert_eq!(heater.mode(), HeaterMode::Auto);
        assert!(!heater.clear_safe_mode(None));
    }
}
