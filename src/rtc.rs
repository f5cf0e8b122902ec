use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use crate::error::{Error, Result};

/// 实时时钟给出的日期时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub day: u8,
    pub month: u8,
    pub year: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub fn new(day: u8, month: u8, year: u16, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            day,
            month,
            year,
            hour,
            minute,
            second,
        }
    }

    /// 安全模式使用的夜间判断，20点和8点整点这两个小时都不算夜间
    pub fn is_night(&self) -> bool {
        (self.hour > 20 && self.minute > 30) || (self.hour < 8 && self.minute < 30)
    }

    fn to_naive(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
            .and_then(|date| {
                date.and_hms_opt(self.hour.into(), self.minute.into(), self.second.into())
            })
            .ok_or_else(|| Error::Rtc(format!("invalid date time {self}")))
    }
}

impl From<NaiveDateTime> for DateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            day: value.day() as u8,
            month: value.month() as u8,
            year: value.year().clamp(0, u16::MAX as i32) as u16,
            hour: value.hour() as u8,
            minute: value.minute() as u8,
            second: value.second() as u8,
        }
    }
}

/// DD/MM/YYYY HH:MM:SS
impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:04} {:02}:{:02}:{:02}",
            self.day, self.month, self.year, self.hour, self.minute, self.second
        )
    }
}

/// 实时时钟
pub trait ClockSource {
    fn date_time(&mut self) -> DateTime;

    fn set_date_time(&mut self, value: DateTime) -> Result<()>;
}

/// 使用系统本地时间的软件时钟，校时只记录与系统时间的偏差
#[derive(Debug, Clone)]
pub struct SystemRtc {
    offset: TimeDelta,
}

impl SystemRtc {
    pub fn new() -> Self {
        Self {
            offset: TimeDelta::zero(),
        }
    }
}

impl Default for SystemRtc {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemRtc {
    fn date_time(&mut self) -> DateTime {
        (Local::now().naive_local() + self.offset).into()
    }

    fn set_date_time(&mut self, value: DateTime) -> Result<()> {
        let target = value.to_naive()?;
        self.offset = target - Local::now().naive_local();
        Ok(())
    }
}

/// 固定时间的时钟，克隆出来的实例共享同一个时间
#[derive(Debug, Clone, Default)]
pub struct FixedRtc {
    now: Rc<Cell<DateTime>>,
}

impl FixedRtc {
    pub fn new(now: DateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime) {
        self.now.set(now);
    }
}

impl ClockSource for FixedRtc {
    fn date_time(&mut self) -> DateTime {
        self.now.get()
    }

    fn set_date_time(&mut self, value: DateTime) -> Result<()> {
        value.to_naive()?;
        self.now.set(value);
        Ok(())
    }
}
