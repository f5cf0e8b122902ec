use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::input_pin_wapper::Pull;

/*** GPIO针脚（BCM编号） ***/

/// DHT11传感器单总线接入GPIO针脚
pub const DHT11_PIN: u8 = 4;
/// 旋转编码器A相、B相
pub const ROTARY_A_PIN: u8 = 5;
pub const ROTARY_B_PIN: u8 = 6;
/// 确认、取消按键
pub const ENTER_BUTTON_PIN: u8 = 17;
pub const CANCEL_BUTTON_PIN: u8 = 16;
/// 环境光传感器数字输出
pub const AMBIENT_LIGHT_PIN: u8 = 20;
/// 加热器、照明继电器
pub const HEATER_RELAY_PIN: u8 = 22;
pub const LIGHT_RELAY_PIN: u8 = 23;
/// 指示灯
pub const LED_HEATER_ON_PIN: u8 = 27;
pub const LED_LOW_TEMPERATURE_PIN: u8 = 19;
pub const LED_LIGHT_ON_PIN: u8 = 26;
/// 多路选择器S0、S1、S2以及公共输出Z
pub const MULTIPLEXER_SELECT_PINS: [u8; 3] = [24, 25, 12];
pub const MULTIPLEXER_OUTPUT_PIN: u8 = 13;

/*** 时间参数 ***/

pub const TICK_INTERVAL_MS: u64 = 50;
pub const BUTTON_SETTLE_MS: u64 = 6;
pub const AMBIENT_SETTLE_MS: u64 = 2000;
/// 定时读取温湿度的间隔
pub const TEMP_HUM_READING_INTERVAL_MS: u64 = 60_000;
/// DHT11数据手册要求两次读取至少间隔1000ms
pub const MIN_TEMP_HUM_READING_INTERVAL_MS: u64 = 1000;
pub const MEASUREMENT_ATTEMPTS: u8 = 5;
pub const MEASUREMENT_BACKOFF_MS: u64 = 3000;

/*** 加热器 ***/

pub const MIN_TEMP_ALLOWED: f32 = 23.0;
pub const MAX_TEMP_ALLOWED: f32 = 30.0;
pub const SAFE_MODE_NIGHTTIME_ON_MS: u64 = 3_600_000;
pub const SAFE_MODE_NIGHTTIME_OFF_MS: u64 = 1_800_000;
pub const SAFE_MODE_DAYTIME_ON_MS: u64 = 1_800_000;
pub const SAFE_MODE_DAYTIME_OFF_MS: u64 = 7_200_000;

/// 控制器配置，所有字段都有默认值，配置文件里只需要写要覆盖的部分
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pins: PinConfig,
    pub timing: TimingConfig,
    pub heater: HeaterConfig,
    /// 事件日志追加写入的文件，为空时写到标准输出
    pub event_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub dht11: u8,
    pub rotary_a: u8,
    pub rotary_b: u8,
    pub enter_button: u8,
    pub cancel_button: u8,
    pub button_pull: Pull,
    pub ambient_light: u8,
    /// 环境光传感器在黑暗时输出高电平
    pub ambient_dark_high: bool,
    pub heater_relay: u8,
    pub light_relay: u8,
    /// 继电器高电平吸合
    pub relay_active_high: bool,
    pub led_heater_on: u8,
    pub led_low_temperature: u8,
    pub led_light_on: u8,
    pub mux_select: [u8; 3],
    pub mux_output: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            dht11: DHT11_PIN,
            rotary_a: ROTARY_A_PIN,
            rotary_b: ROTARY_B_PIN,
            enter_button: ENTER_BUTTON_PIN,
            cancel_button: CANCEL_BUTTON_PIN,
            button_pull: Pull::Up,
            ambient_light: AMBIENT_LIGHT_PIN,
            ambient_dark_high: true,
            heater_relay: HEATER_RELAY_PIN,
            light_relay: LIGHT_RELAY_PIN,
            relay_active_high: true,
            led_heater_on: LED_HEATER_ON_PIN,
            led_low_temperature: LED_LOW_TEMPERATURE_PIN,
            led_light_on: LED_LIGHT_ON_PIN,
            mux_select: MULTIPLEXER_SELECT_PINS,
            mux_output: MULTIPLEXER_OUTPUT_PIN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub button_settle_ms: u64,
    pub ambient_settle_ms: u64,
    /// 多路选择器切换后等待的时间，大部分芯片不需要
    pub mux_settle_us: u64,
    pub sensor_interval_ms: u64,
    pub sensor_min_interval_ms: u64,
    pub retry_attempts: u8,
    pub retry_backoff_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_INTERVAL_MS,
            button_settle_ms: BUTTON_SETTLE_MS,
            ambient_settle_ms: AMBIENT_SETTLE_MS,
            mux_settle_us: 0,
            sensor_interval_ms: TEMP_HUM_READING_INTERVAL_MS,
            sensor_min_interval_ms: MIN_TEMP_HUM_READING_INTERVAL_MS,
            retry_attempts: MEASUREMENT_ATTEMPTS,
            retry_backoff_ms: MEASUREMENT_BACKOFF_MS,
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn button_settle(&self) -> Duration {
        Duration::from_millis(self.button_settle_ms)
    }

    pub fn ambient_settle(&self) -> Duration {
        Duration::from_millis(self.ambient_settle_ms)
    }

    pub fn mux_settle(&self) -> Duration {
        Duration::from_micros(self.mux_settle_us)
    }

    pub fn sensor_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_interval_ms)
    }

    pub fn sensor_min_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_min_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaterConfig {
    pub min_temp_c: f32,
    pub max_temp_c: f32,
    pub night_on_ms: u64,
    pub night_off_ms: u64,
    pub day_on_ms: u64,
    pub day_off_ms: u64,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            min_temp_c: MIN_TEMP_ALLOWED,
            max_temp_c: MAX_TEMP_ALLOWED,
            night_on_ms: SAFE_MODE_NIGHTTIME_ON_MS,
            night_off_ms: SAFE_MODE_NIGHTTIME_OFF_MS,
            day_on_ms: SAFE_MODE_DAYTIME_ON_MS,
            day_off_ms: SAFE_MODE_DAYTIME_OFF_MS,
        }
    }
}

impl Config {
    /// 从YAML文件加载配置
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(text).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;
        if timing.sensor_min_interval_ms < MIN_TEMP_HUM_READING_INTERVAL_MS {
            return Err(Error::Config(format!(
                "sensor_min_interval_ms must be at least {MIN_TEMP_HUM_READING_INTERVAL_MS}"
            )));
        }
        if timing.sensor_interval_ms < timing.sensor_min_interval_ms {
            return Err(Error::Config(
                "sensor_interval_ms must not be shorter than sensor_min_interval_ms".into(),
            ));
        }
        if self.heater.min_temp_c >= self.heater.max_temp_c {
            return Err(Error::Config("min_temp_c must be below max_temp_c".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
pins:
  heater_relay: 21
timing:
  retry_attempts: 3
"#,
        )
        .unwrap();
        assert_eq!(config.pins.heater_relay, 21);
        assert_eq!(config.pins.dht11, DHT11_PIN);
        assert_eq!(config.timing.retry_attempts, 3);
        assert_eq!(config.timing.retry_backoff(), Duration::from_millis(3000));
        assert_eq!(config.heater.max_temp_c, MAX_TEMP_ALLOWED);
    }

    #[test]
    fn rejects_reading_interval_below_datasheet_minimum() {
        let err = Config::from_yaml("timing:\n  sensor_min_interval_ms: 500\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_inverted_temperature_limits() {
        let err = Config::from_yaml("heater:\n  min_temp_c: 31\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
