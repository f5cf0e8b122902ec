use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{self, Result};

/// 继电器开关驱动
///
/// - `active`: 闭合开关时针脚需要输出的电平
/// - 已闭合时再次闭合（已断开时再次断开）不会写针脚
pub struct Driver<P> {
    pin: P,
    active: PinState,
    closed: bool,
}

impl<P: OutputPin> Driver<P> {
    /// 创建继电器实例，初始为断开状态
    pub fn new(mut pin: P, active: PinState) -> Result<Self> {
        pin.set_state(!active).map_err(error::gpio)?;
        Ok(Self {
            pin,
            active,
            closed: false,
        })
    }

    /// 闭合开关，返回是否真的发生了切换
    pub fn on(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        self.pin.set_state(self.active).map_err(error::gpio)?;
        self.closed = true;
        Ok(true)
    }

    /// 断开开关，返回是否真的发生了切换
    pub fn off(&mut self) -> Result<bool> {
        if !self.closed {
            return Ok(false);
        }
        self.pin.set_state(!self.active).map_err(error::gpio)?;
        self.closed = false;
        Ok(true)
    }

    pub fn is_on(&self) -> bool {
        self.closed
    }
}
