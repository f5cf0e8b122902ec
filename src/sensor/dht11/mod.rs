use std::time::Duration;

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_timers::clock::Clock;

use super::{Measurement, TempHumSensor};
use crate::error::SensorError;

/// 主机拉低数据线的起始信号时长
const START_SIGNAL: Duration = Duration::from_millis(18);
/// 释放总线后等待传感器响应前的高电平时长
const RELEASE: Duration = Duration::from_micros(30);
/// 每个电平阶段的最长等待时间
const EDGE_TIMEOUT: Duration = Duration::from_micros(1000);
/// 高电平超过该时长表示数据位为1
const ONE_BIT_THRESHOLD: Duration = Duration::from_micros(40);

/// DHT11 温度、湿度二合一传感器封装对象
///
/// 数据线需要一个可以在输入、输出之间切换的针脚（见`IoPinWapper`）
pub struct DHT11<P, C> {
    pin: P,
    clock: C,
}

impl<P, C> DHT11<P, C>
where
    P: InputPin + OutputPin,
    C: Clock,
    C::Instant: Copy,
{
    pub fn new(pin: P, clock: C) -> Self {
        Self { pin, clock }
    }

    /// 忙等待，线程休眠的精度满足不了DHT11的时序要求
    fn spin(&self, duration: Duration) {
        let start = self.clock.now();
        while self.clock.elapsed(start) < duration {}
    }

    fn level(&mut self) -> Result<bool, SensorError> {
        self.pin
            .is_high()
            .map_err(|err| SensorError::Bus(embedded_hal::digital::Error::kind(&err)))
    }

    /// 在超时时间内等待目标电平
    fn wait_for(&mut self, high: bool, stage: &'static str) -> Result<(), SensorError> {
        let start = self.clock.now();
        while self.level()? != high {
            if self.clock.elapsed(start) > EDGE_TIMEOUT {
                return Err(SensorError::Timeout(stage));
            }
        }
        Ok(())
    }

    /// 测量高电平持续时间
    fn measure_high(&mut self) -> Result<Duration, SensorError> {
        let start = self.clock.now();
        while self.level()? {
            if self.clock.elapsed(start) > EDGE_TIMEOUT {
                return Err(SensorError::Timeout("bit end"));
            }
        }
        Ok(self.clock.elapsed(start))
    }

    fn start_signal(&mut self) -> Result<(), SensorError> {
        let bus = |err: P::Error| SensorError::Bus(embedded_hal::digital::Error::kind(&err));
        self.pin.set_low().map_err(bus)?;
        self.spin(START_SIGNAL);
        self.pin.set_high().map_err(bus)?;
        self.spin(RELEASE);
        Ok(())
    }

    /// 读取40位原始数据
    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.start_signal()?;

        // 响应：低电平80us，高电平80us，然后进入数据阶段
        self.wait_for(false, "response start")?;
        self.wait_for(true, "response end")?;
        self.wait_for(false, "data start")?;

        let mut frame = [0u8; 5];
        for byte in frame.iter_mut() {
            for bit in 0..8 {
                self.wait_for(true, "bit start")?;
                if self.measure_high()? > ONE_BIT_THRESHOLD {
                    *byte |= 1 << (7 - bit);
                }
            }
        }
        Ok(frame)
    }
}

impl<P, C> TempHumSensor for DHT11<P, C>
where
    P: InputPin + OutputPin,
    C: Clock,
    C::Instant: Copy,
{
    fn read(&mut self) -> Result<Measurement, SensorError> {
        let frame = self.read_frame()?;
        decode_frame(&frame)
    }
}

/// 解析40位数据
///
/// 8bit湿度整数 + 8bit湿度小数 + 8bit温度整数 + 8bit温度小数 + 8bit校验和，
/// 温度小数字节最高位为1表示负温度，校验和为前四个字节之和的低8位
pub fn decode_frame(frame: &[u8; 5]) -> Result<Measurement, SensorError> {
    let checksum = frame[0]
        .wrapping_add(frame[1])
        .wrapping_add(frame[2])
        .wrapping_add(frame[3]);
    if checksum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity_pct = frame[0] as f32 + frame[1] as f32 / 10.0;
    let magnitude = frame[2] as f32 + (frame[3] & 0x7F) as f32 / 10.0;
    let temperature_c = if frame[3] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    Ok(Measurement {
        temperature_c,
        humidity_pct,
    })
}
