pub mod button;
pub mod dht11;
pub mod led;
pub mod multiplexer;
pub mod rotary;
pub mod switch;

use crate::error::SensorError;

/// 一次温湿度测量结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// 温湿度传感器
#[cfg_attr(test, mockall::automock)]
pub trait TempHumSensor {
    /// 立即从硬件读取一次
    fn read(&mut self) -> Result<Measurement, SensorError>;
}
