use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_timers::clock::Clock;
use tracing::{debug, warn};

use crate::config::{
    MEASUREMENT_ATTEMPTS, MEASUREMENT_BACKOFF_MS, MIN_TEMP_HUM_READING_INTERVAL_MS,
    TEMP_HUM_READING_INTERVAL_MS,
};
use crate::error::SensorError;
use crate::event_log::{EventLog, system};
use crate::rtc::ClockSource;
use crate::sensor::{Measurement, TempHumSensor};

/// 最近一次读取的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    Ok,
    ChecksumError,
    Timeout,
}

impl From<&SensorError> for ReadResult {
    fn from(err: &SensorError) -> Self {
        match err {
            SensorError::Checksum => ReadResult::ChecksumError,
            _ => ReadResult::Timeout,
        }
    }
}

/// 缓存的温湿度读数，失败时保留上一次成功的值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading<I> {
    pub measurement: Option<Measurement>,
    pub last_read_at: Option<I>,
    pub last_result: ReadResult,
}

impl<I> Default for SensorReading<I> {
    fn default() -> Self {
        Self {
            measurement: None,
            last_read_at: None,
            last_result: ReadResult::Ok,
        }
    }
}

impl<I> SensorReading<I> {
    pub fn temperature_c(&self) -> Option<f32> {
        self.measurement.map(|m| m.temperature_c)
    }

    pub fn humidity_pct(&self) -> Option<f32> {
        self.measurement.map(|m| m.humidity_pct)
    }
}

/// 限速的温湿度读取
///
/// - 非强制读取在最小间隔内直接返回缓存结果
/// - 强制读取忽略缓存，但仍会等满硬件要求的最小间隔
/// - 不论成功失败都更新`last_read_at`
pub struct Acquisition<S, I> {
    sensor: S,
    min_interval: Duration,
    reading: SensorReading<I>,
    last_error: Option<SensorError>,
}

impl<S: TempHumSensor, I: Copy> Acquisition<S, I> {
    pub fn new(sensor: S) -> Self {
        Self::with_min_interval(
            sensor,
            Duration::from_millis(MIN_TEMP_HUM_READING_INTERVAL_MS),
        )
    }

    pub fn with_min_interval(sensor: S, min_interval: Duration) -> Self {
        Self {
            sensor,
            min_interval,
            reading: SensorReading::default(),
            last_error: None,
        }
    }

    pub fn reading(&self) -> &SensorReading<I> {
        &self.reading
    }

    pub fn read<C, D>(
        &mut self,
        force: bool,
        clock: &C,
        delay: &mut D,
    ) -> Result<SensorReading<I>, SensorError>
    where
        C: Clock<Instant = I>,
        D: DelayNs,
    {
        if let Some(last) = self.reading.last_read_at {
            let elapsed = clock.elapsed(last);
            if elapsed < self.min_interval {
                if !force {
                    return match self.last_error {
                        Some(err) => Err(err),
                        None => Ok(self.reading),
                    };
                }
                let rest = self.min_interval - elapsed;
                delay.delay_us(u32::try_from(rest.as_micros()).unwrap_or(u32::MAX));
            }
        }

        let result = self.sensor.read();
        self.reading.last_read_at = Some(clock.now());
        match result {
            Ok(measurement) => {
                self.reading.measurement = Some(measurement);
                self.reading.last_result = ReadResult::Ok;
                self.last_error = None;
                Ok(self.reading)
            }
            Err(err) => {
                self.reading.last_result = ReadResult::from(&err);
                self.last_error = Some(err);
                Err(err)
            }
        }
    }
}

/// 读取失败后的强制重读策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u8,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: MEASUREMENT_ATTEMPTS,
            backoff: Duration::from_millis(MEASUREMENT_BACKOFF_MS),
        }
    }
}

/// 一次定时检查的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorOutcome<I> {
    /// 还没到读取时间
    NotDue,
    Fresh(SensorReading<I>),
    /// 所有重读都失败
    Failed(SensorError),
}

/// 定时读取温湿度，失败时按策略重读
pub struct TempHumMonitor<S, I> {
    acquisition: Acquisition<S, I>,
    interval: Duration,
    policy: RetryPolicy,
}

impl<S: TempHumSensor, I: Copy> TempHumMonitor<S, I> {
    pub fn new(acquisition: Acquisition<S, I>) -> Self {
        Self {
            acquisition,
            interval: Duration::from_millis(TEMP_HUM_READING_INTERVAL_MS),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn reading(&self) -> &SensorReading<I> {
        self.acquisition.reading()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn is_due<C>(&self, clock: &C) -> bool
    where
        C: Clock<Instant = I>,
    {
        self.acquisition
            .reading()
            .last_read_at
            .is_none_or(|last| clock.elapsed(last) >= self.interval)
    }

    /// 到时间就读取一次，失败后每次等待`backoff`再强制重读，最多`attempts`次
    ///
    /// 重读期间阻塞调用者
    pub fn poll<C, D, R, L>(
        &mut self,
        clock: &C,
        delay: &mut D,
        rtc: &mut R,
        log: &mut L,
    ) -> SensorOutcome<I>
    where
        C: Clock<Instant = I>,
        D: DelayNs,
        R: ClockSource,
        L: EventLog,
    {
        if !self.is_due(clock) {
            return SensorOutcome::NotDue;
        }

        let mut result = self.acquisition.read(false, clock, delay);
        let mut retries = 0;
        loop {
            let err = match result {
                Ok(reading) => {
                    if let Some(m) = reading.measurement {
                        debug!(
                            temperature = m.temperature_c,
                            humidity = m.humidity_pct,
                            retries,
                            "temperature/humidity read"
                        );
                    }
                    return SensorOutcome::Fresh(reading);
                }
                Err(err) => err,
            };

            warn!(%err, retries, "temperature/humidity read failed");
            let message = match err {
                SensorError::Checksum => "Checksum error occured",
                _ => "Timeout error occured",
            };
            log.log(system::TEMP_HUM, rtc.date_time(), message);

            if retries >= self.policy.attempts {
                break;
            }
            delay.delay_ms(u32::try_from(self.policy.backoff.as_millis()).unwrap_or(u32::MAX));
            retries += 1;
            result = self.acquisition.read(true, clock, delay);
        }

        SensorOutcome::Failed(SensorError::PersistentFailure {
            attempts: self.policy.attempts,
        })
    }
}
