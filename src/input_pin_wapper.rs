use std::convert::Infallible;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin};
use rppal::gpio::{self, Gpio, Trigger};
use serde::Deserialize;

/// 输入针脚上下拉电阻配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull {
    /// 内部上拉（按键、开关接地有效）
    #[default]
    Up,
    /// 内部下拉
    Down,
    /// 外部电路自行提供电平
    Floating,
}

/// Input Pin Wapper
///
/// rppal输入针脚读取不会失败，所以错误类型为`Infallible`
pub struct InputPinWapper {
    pin: gpio::InputPin,
}

impl ErrorType for InputPinWapper {
    type Error = Infallible;
}

impl InputPinWapper {
    /// 按BCM编号打开输入针脚
    pub fn open(gpio: &Gpio, bcm: u8, pull: Pull) -> anyhow::Result<Self> {
        let pin = gpio.get(bcm)?;
        let pin = match pull {
            Pull::Up => pin.into_input_pullup(),
            Pull::Down => pin.into_input_pulldown(),
            Pull::Floating => pin.into_input(),
        };
        Ok(Self { pin })
    }

    /// BCM针脚编号
    pub fn bcm(&self) -> u8 {
        self.pin.pin()
    }

    /// 监听电平变化（上升沿和下降沿都监听），回调参数为变化后的电平是否为高
    ///
    /// 回调运行在rppal的中断线程里，只能做很少的工作
    pub fn on_edge<F>(&mut self, debounce: Option<Duration>, mut cb: F) -> anyhow::Result<()>
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.pin.set_async_interrupt(Trigger::Both, debounce, move |event| {
            cb(event.trigger == Trigger::RisingEdge)
        })?;
        Ok(())
    }
}

impl InputPin for InputPinWapper {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_low())
    }
}
