use std::time::Duration;

use embedded_hal::digital::{InputPin, PinState};
use embedded_timers::clock::Clock;

use crate::error::{self, Result};

/// 机械按键默认消抖时间
pub const SETTLE_INTERVAL: Duration = Duration::from_millis(6);

/// 消抖状态机所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 观察原始电平是否变化
    Watching,
    /// 电平刚变化，稳定时间内的抖动全部忽略
    Ignoring,
}

/// 单个按键的消抖状态
///
/// - 原始信号变化后进入`Ignoring`并记录时间
/// - 原始信号在稳定时间内保持不变才提交为新的稳定状态
/// - 稳定时间内再次变化会重新计时
#[derive(Debug, Clone)]
pub struct DebounceState<I> {
    raw: bool,
    stable: bool,
    last_change: Option<I>,
    phase: Phase,
    settle: Duration,
}

impl<I: Copy> DebounceState<I> {
    pub fn new(initial: bool, settle: Duration) -> Self {
        Self {
            raw: initial,
            stable: initial,
            last_change: None,
            phase: Phase::Watching,
            settle,
        }
    }

    /// 送入一次原始采样，返回消抖后的稳定状态
    pub fn update<C>(&mut self, raw: bool, clock: &C) -> bool
    where
        C: Clock<Instant = I>,
    {
        match self.phase {
            Phase::Watching => {
                if raw != self.raw {
                    self.raw = raw;
                    self.last_change = Some(clock.now());
                    self.phase = Phase::Ignoring;
                }
            }
            Phase::Ignoring => {
                if raw != self.raw {
                    self.raw = raw;
                    self.last_change = Some(clock.now());
                } else if self
                    .last_change
                    .is_none_or(|since| clock.elapsed(since) >= self.settle)
                {
                    self.stable = raw;
                    self.phase = Phase::Watching;
                }
            }
        }
        self.stable
    }

    pub fn stable(&self) -> bool {
        self.stable
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_change(&self) -> Option<I> {
        self.last_change
    }
}

/// 带消抖的按键驱动
///
/// - `active`: 按下时针脚的电平（上拉接地的按键为Low）
pub struct AntishakeDriver<P, I> {
    pin: P,
    active: PinState,
    debounce: DebounceState<I>,
    reported: bool,
}

impl<P: InputPin, I: Copy> AntishakeDriver<P, I> {
    pub fn new(pin: P, active: PinState) -> Self {
        Self::with_settle(pin, active, SETTLE_INTERVAL)
    }

    pub fn with_settle(pin: P, active: PinState, settle: Duration) -> Self {
        Self {
            pin,
            active,
            debounce: DebounceState::new(false, settle),
            reported: false,
        }
    }

    /// 读取消抖后的按键状态
    ///
    /// - True: 按下（有效电平）
    /// - False: 松开
    pub fn state<C>(&mut self, clock: &C) -> Result<bool>
    where
        C: Clock<Instant = I>,
    {
        let high = self.pin.is_high().map_err(error::gpio)?;
        let active = match self.active {
            PinState::High => high,
            PinState::Low => !high,
        };
        Ok(self.debounce.update(active, clock))
    }

    /// 稳定状态从松开变为按下时返回true，每次按下只报告一次
    pub fn just_pressed<C>(&mut self, clock: &C) -> Result<bool>
    where
        C: Clock<Instant = I>,
    {
        let state = self.state(clock)?;
        let pressed = state && !self.reported;
        self.reported = state;
        Ok(pressed)
    }
}
