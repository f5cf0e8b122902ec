use std::fmt;
use std::io::Write;

use tracing::{info, warn};

use crate::rtc::DateTime;

/// 事件日志里的子系统名
pub mod system {
    pub const HEATER: &str = "HEATER";
    pub const LIGHT: &str = "LIGHT";
    pub const TEMP_HUM: &str = "TEMP/HUM";
    pub const RTC: &str = "RTC";
    pub const MENU: &str = "MENU";
}

/// 一条事件记录，文本格式为`SYSTEM;DD/MM/YYYY HH:MM:SS;MESSAGE`
///
/// 外部工具按`;`切分字段，加热器消息内部再按`#`切分，格式不能改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub system: &'static str,
    pub at: DateTime,
    pub message: String,
}

impl LogRecord {
    pub fn new(system: &'static str, at: DateTime, message: impl Into<String>) -> Self {
        Self {
            system,
            at,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.system, self.at, self.message)
    }
}

/// 事件日志
pub trait EventLog {
    fn record(&mut self, record: LogRecord);

    fn log(&mut self, system: &'static str, at: DateTime, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.record(LogRecord::new(system, at, message));
    }
}

/// 保存在内存里的事件日志
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    records: Vec<LogRecord>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// 所有记录的文本行
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    /// 某个子系统的消息部分
    pub fn messages(&self, system: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|record| record.system == system)
            .map(|record| record.message.as_str())
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl EventLog for MemoryLog {
    fn record(&mut self, record: LogRecord) {
        self.records.push(record);
    }
}

/// 按行写入任意输出（标准输出、文件）
pub struct WriterLog<W> {
    writer: W,
}

impl<W: Write> WriterLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventLog for WriterLog<W> {
    fn record(&mut self, record: LogRecord) {
        let written = writeln!(self.writer, "{record}").and_then(|_| self.writer.flush());
        if let Err(err) = written {
            // 日志写不进去不能影响控制回路
            warn!(%err, %record, "failed to write event log");
        }
    }
}

/// 把事件记录转发给tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn record(&mut self, record: LogRecord) {
        info!(target: "event", system = record.system, "{record}");
    }
}
