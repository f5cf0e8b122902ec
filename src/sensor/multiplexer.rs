use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::error::{self, Error, Result};

/// 多路选择器输入编号
pub mod input {
    pub const HEATER_AUTO: u8 = 0;
    pub const HEATER_OFF: u8 = 1;
    pub const HEATER_ON: u8 = 2;
    pub const LIGHT_AUTO: u8 = 3;
    pub const LIGHT_OFF: u8 = 4;
    pub const LIGHT_ON: u8 = 5;
    pub const SHUTOFF_BUTTON: u8 = 6;
}

/// 一组可按编号读取的开关
pub trait SwitchBank {
    /// 读取指定输入的电平，true为高电平
    fn read_input(&mut self, index: u8) -> Result<bool>;
}

/// 多路选择器（如CD4051）封装对象
///
/// - `select`: S0..Sn选择线，第i位驱动第i根选择线
/// - `output`: 公共输出线Z
/// - `settle`: 切换选择线后等待信号稳定的时间
pub struct Multiplexer<S, Z, D, const N: usize> {
    select: [S; N],
    output: Z,
    delay: D,
    settle: Duration,
}

impl<S, Z, D, const N: usize> Multiplexer<S, Z, D, N>
where
    S: OutputPin,
    Z: InputPin,
    D: DelayNs,
{
    pub fn new(select: [S; N], output: Z, delay: D) -> Self {
        Self {
            select,
            output,
            delay,
            settle: Duration::ZERO,
        }
    }

    /// 设置选择线切换后的稳定等待时间
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// 可选输入的数量
    pub fn inputs(&self) -> usize {
        1 << N
    }

    fn select(&mut self, index: u8) -> Result<()> {
        if usize::from(index) >= self.inputs() {
            return Err(Error::MuxInput { index, lines: N });
        }
        for (bit, line) in self.select.iter_mut().enumerate() {
            let level = PinState::from((index >> bit) & 1 == 1);
            line.set_state(level).map_err(error::gpio)?;
        }
        if !self.settle.is_zero() {
            self.delay.delay_us(self.settle_us());
        }
        Ok(())
    }

    /// 超出`u32`的等待时间取上限
    fn settle_us(&self) -> u32 {
        u32::try_from(self.settle.as_micros()).unwrap_or(u32::MAX)
    }
}

impl<S, Z, D, const N: usize> SwitchBank for Multiplexer<S, Z, D, N>
where
    S: OutputPin,
    Z: InputPin,
    D: DelayNs,
{
    fn read_input(&mut self, index: u8) -> Result<bool> {
        self.select(index)?;
        self.output.is_high().map_err(error::gpio)
    }
}
