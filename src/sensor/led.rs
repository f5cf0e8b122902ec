use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{self, Result};

/// LED指示灯封装对象
pub struct Driver<P> {
    pin: P,
    active: PinState,
    lit: bool,
}

impl<P: OutputPin> Driver<P> {
    /// 创建LED实例，初始为熄灭状态
    pub fn new(mut pin: P, active: PinState) -> Result<Self> {
        pin.set_state(!active).map_err(error::gpio)?;
        Ok(Self {
            pin,
            active,
            lit: false,
        })
    }

    /// 点亮或熄灭，状态没变化时不写针脚
    pub fn set(&mut self, lit: bool) -> Result<()> {
        if self.lit != lit {
            let level = if lit { self.active } else { !self.active };
            self.pin.set_state(level).map_err(error::gpio)?;
            self.lit = lit;
        }
        Ok(())
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
