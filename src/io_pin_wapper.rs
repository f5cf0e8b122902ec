use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use rppal::gpio::{Gpio, IoPin, Level, Mode};

/// I/O Pin Wapper
///
/// 单总线传感器(DHT11)的数据线需要在输出和输入之间来回切换，
/// 读操作自动切到输入模式，写操作自动切到输出模式
pub struct IoPinWapper {
    pin: IoPin,
    mode: Mode,
}

impl ErrorType for IoPinWapper {
    type Error = Infallible;
}

impl IoPinWapper {
    /// 按BCM编号打开I/O针脚，初始为输出高电平（总线空闲）
    pub fn open(gpio: &Gpio, bcm: u8) -> anyhow::Result<Self> {
        let mut pin = gpio.get(bcm)?.into_io(Mode::Output);
        pin.set_high();
        Ok(Self {
            pin,
            mode: Mode::Output,
        })
    }

    fn switch_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.pin.set_mode(mode);
            self.mode = mode;
        }
    }

    fn sample(&mut self) -> Level {
        self.switch_mode(Mode::Input);
        self.pin.read()
    }

    fn drive(&mut self, level: Level) {
        self.switch_mode(Mode::Output);
        self.pin.write(level);
    }
}

impl InputPin for IoPinWapper {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample() == Level::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample() == Level::Low)
    }
}

impl OutputPin for IoPinWapper {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::High);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(Level::Low);
        Ok(())
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        self.drive(match state {
            PinState::High => Level::High,
            PinState::Low => Level::Low,
        });
        Ok(())
    }
}
