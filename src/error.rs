use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// 温湿度传感器读取错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    /// 等待传感器电平超时
    #[error("sensor timeout while waiting for {0}")]
    Timeout(&'static str),
    /// 校验和不一致
    #[error("sensor checksum mismatch")]
    Checksum,
    /// 数据线GPIO读写失败
    #[error("sensor bus error: {0:?}")]
    Bus(ErrorKind),
    /// 多次强制重读后依然失败
    #[error("sensor failed after {attempts} forced re-reads")]
    PersistentFailure { attempts: u8 },
}

/// 控制器错误
#[derive(Debug, Error)]
pub enum Error {
    #[error("gpio error: {0:?}")]
    Gpio(ErrorKind),
    #[error("multiplexer input {index} out of range (select lines: {lines})")]
    MuxInput { index: u8, lines: usize },
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error("config error: {0}")]
    Config(String),
    #[error("rtc error: {0}")]
    Rtc(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// embedded-hal针脚错误统一转换为ErrorKind
pub(crate) fn gpio<E: embedded_hal::digital::Error>(err: E) -> Error {
    Error::Gpio(err.kind())
}
