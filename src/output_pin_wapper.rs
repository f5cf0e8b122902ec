use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use rppal::gpio::{self, Gpio};

/// Output Pin Wapper
///
/// 继电器、LED、多路选择器的选择线都通过它驱动
pub struct OutputPinWapper {
    pin: gpio::OutputPin,
}

impl ErrorType for OutputPinWapper {
    type Error = Infallible;
}

impl OutputPinWapper {
    /// 按BCM编号打开输出针脚，并立即输出初始电平
    pub fn open(gpio: &Gpio, bcm: u8, initial: PinState) -> anyhow::Result<Self> {
        let pin = gpio.get(bcm)?;
        let mut pin = match initial {
            PinState::High => pin.into_output_high(),
            PinState::Low => pin.into_output_low(),
        };
        // 进程退出时保持最后一次输出的电平会让继电器一直吸合
        pin.set_reset_on_drop(true);
        Ok(Self { pin })
    }

    /// 打开一组输出针脚（多路选择器的S0..Sn）
    pub fn open_all<const N: usize>(gpio: &Gpio, bcm: [u8; N]) -> anyhow::Result<[Self; N]> {
        let mut pins = Vec::with_capacity(N);
        for pin in bcm {
            pins.push(Self::open(gpio, pin, PinState::Low)?);
        }
        pins.try_into()
            .map_err(|_| anyhow::anyhow!("针脚数量不一致"))
    }
}

impl OutputPin for OutputPinWapper {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        Ok(())
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        self.pin.write(match state {
            PinState::High => gpio::Level::High,
            PinState::Low => gpio::Level::Low,
        });
        Ok(())
    }
}
