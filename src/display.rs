use tracing::{debug, info};

use crate::error::Result;
use crate::rtc::DateTime;

/// 当前显示的页面
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panel {
    /// 状态页，同时显示菜单
    Status,
    /// 正在修改最低温度，`draft`为未确认的值
    EditSetpoint { draft: f32 },
    /// 累计加热时间
    HeatingTime,
    /// 累计照明时间
    LightingTime,
}

/// 交给显示屏的状态快照，只包含已经算好的值
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub at: DateTime,
    pub heater_mode: &'static str,
    pub heater_on: bool,
    pub setpoint_c: f32,
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub light_mode: &'static str,
    pub light_on: bool,
    pub heating_seconds: f64,
    pub lighting_seconds: f64,
    pub previous_item: &'static str,
    pub current_item: &'static str,
    pub next_item: &'static str,
    pub panel: Panel,
}

/// 显示屏
pub trait DisplayDriver {
    /// 打开或关闭背光/电源
    fn set_power(&mut self, on: bool) -> Result<()>;

    fn render(&mut self, view: &StatusView) -> Result<()>;
}

/// 没有接屏幕时把画面输出到tracing
#[derive(Debug, Default)]
pub struct TracingDisplay {
    powered: bool,
}

impl DisplayDriver for TracingDisplay {
    fn set_power(&mut self, on: bool) -> Result<()> {
        if self.powered != on {
            info!(on, "display power");
        }
        self.powered = on;
        Ok(())
    }

    fn render(&mut self, view: &StatusView) -> Result<()> {
        if !self.powered {
            return Ok(());
        }
        let reading = match (view.temperature_c, view.humidity_pct) {
            (Some(t), Some(h)) => format!("{t:.1}C {h:.0}%"),
            _ => "--".to_string(),
        };
        match view.panel {
            Panel::Status => debug!(
                at = %view.at,
                heater = view.heater_mode,
                heater_on = view.heater_on,
                light = view.light_mode,
                light_on = view.light_on,
                setpoint = view.setpoint_c,
                %reading,
                "[{}] <{}> [{}]",
                view.previous_item,
                view.current_item,
                view.next_item
            ),
            Panel::EditSetpoint { draft } => {
                debug!(at = %view.at, "min. temperature: {draft:.0}C")
            }
            Panel::HeatingTime => {
                debug!(at = %view.at, "heating time: {:.0}s", view.heating_seconds)
            }
            Panel::LightingTime => {
                debug!(at = %view.at, "lighting time: {:.0}s", view.lighting_seconds)
            }
        }
        Ok(())
    }
}
