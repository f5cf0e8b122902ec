use embedded_hal::digital::OutputPin;
use embedded_timers::clock::Clock;
use tracing::info;

use super::switches::ModeSelector;
use super::tracking::OnTimeTracker;
use crate::error::Result;
use crate::event_log::{EventLog, system};
use crate::rtc::DateTime;
use crate::sensor::switch;

/// 照明模式和加热器共用三段开关的语义
pub type LightMode = ModeSelector;

/// 照明控制：AUTO模式下环境变暗就开灯
pub struct LightController<R, I> {
    relay: switch::Driver<R>,
    mode: LightMode,
    tracker: OnTimeTracker<I>,
}

impl<R: OutputPin, I: Copy> LightController<R, I> {
    pub fn new(relay: switch::Driver<R>) -> Self {
        Self {
            relay,
            mode: LightMode::Off,
            tracker: OnTimeTracker::new(),
        }
    }

    pub fn mode(&self) -> LightMode {
        self.mode
    }

    pub fn is_on(&self) -> bool {
        self.relay.is_on()
    }

    pub fn total_on_seconds(&self) -> f64 {
        self.tracker.total_seconds()
    }

    /// 开关都无效时保持原模式
    pub fn apply_switches(&mut self, selected: Option<ModeSelector>) {
        if let Some(selected) = selected {
            self.mode = selected;
        }
    }

    /// - `dark`: 消抖后的环境光状态
    pub fn evaluate<C, L>(
        &mut self,
        dark: bool,
        at: &DateTime,
        clock: &C,
        log: &mut L,
    ) -> Result<()>
    where
        C: Clock<Instant = I>,
        L: EventLog,
    {
        self.tracker.update(clock);
        let wanted = match self.mode {
            LightMode::Auto => dark,
            LightMode::Off => false,
            LightMode::On => true,
        };
        let switched = if wanted {
            self.relay.on()?
        } else {
            self.relay.off()?
        };
        if switched {
            if wanted {
                self.tracker.start(clock);
            } else {
                self.tracker.stop(clock);
            }
            let action = if wanted { "ON" } else { "OFF" };
            let total = self.tracker.total_seconds();
            info!(mode = self.mode.name(), action, total, "light switched");
            log.log(
                system::LIGHT,
                *at,
                format!("{}#{}#{:.2}", self.mode.name(), action, total),
            );
        }
        Ok(())
    }
}
