use std::sync::Arc;
use std::time::Instant;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use tracing::{debug, info, warn};

use super::acquisition::{Acquisition, RetryPolicy, SensorOutcome, TempHumMonitor};
use super::heater::{HeaterController, HeaterSettings};
use super::lighting::LightController;
use super::menu::{MenuAction, MenuNavigator};
use super::switches::SwitchPosition;
use crate::config::Config;
use crate::display::{DisplayDriver, StatusView};
use crate::error::Result;
use crate::event_log::{EventLog, system};
use crate::input_pin_wapper::Pull;
use crate::rtc::{ClockSource, DateTime};
use crate::sensor::TempHumSensor;
use crate::sensor::button::{AntishakeDriver, DebounceState};
use crate::sensor::multiplexer::{SwitchBank, input};
use crate::sensor::rotary::EdgeEvents;
use crate::sensor::{led, switch};

/// 控制器依赖的全部硬件类型
pub trait Platform {
    type Switches: SwitchBank;
    type Input: InputPin;
    type Output: OutputPin;
    type Sensor: TempHumSensor;
    type Clock: embedded_timers::clock::Clock<Instant = Instant>;
    type Delay: DelayNs;
    type Rtc: ClockSource;
    type Log: EventLog;
    type Display: DisplayDriver;
}

/// 已经打开好的硬件
pub struct Board<P: Platform> {
    pub switches: P::Switches,
    pub enter_button: P::Input,
    pub cancel_button: P::Input,
    pub ambient_light: P::Input,
    pub heater_relay: P::Output,
    pub light_relay: P::Output,
    pub led_heater_on: P::Output,
    pub led_low_temperature: P::Output,
    pub led_light_on: P::Output,
    pub sensor: P::Sensor,
    pub clock: P::Clock,
    pub delay: P::Delay,
    pub rtc: P::Rtc,
    pub log: P::Log,
    pub display: P::Display,
    /// 旋转编码器中断回调累加的边沿计数
    pub rotary: Arc<EdgeEvents>,
}

struct Indicators<O> {
    heater_on: led::Driver<O>,
    low_temperature: led::Driver<O>,
    light_on: led::Driver<O>,
}

/// 主控制器，`tick`周期调用
pub struct Controller<P: Platform> {
    switches: P::Switches,
    enter: AntishakeDriver<P::Input, Instant>,
    cancel: AntishakeDriver<P::Input, Instant>,
    ambient: AntishakeDriver<P::Input, Instant>,
    shutoff: DebounceState<Instant>,
    shutoff_pressed: bool,
    monitor: TempHumMonitor<P::Sensor, Instant>,
    heater: HeaterController<P::Output, Instant>,
    lighting: LightController<P::Output, Instant>,
    indicators: Indicators<P::Output>,
    navigator: MenuNavigator,
    clock: P::Clock,
    delay: P::Delay,
    rtc: P::Rtc,
    log: P::Log,
    display: P::Display,
    rotary: Arc<EdgeEvents>,
    display_powered: Option<bool>,
    last_view: Option<StatusView>,
}

impl<P: Platform> Controller<P> {
    pub fn new(board: Board<P>, config: &Config) -> Result<Self> {
        let pins = &config.pins;
        let timing = &config.timing;
        let button_active = match pins.button_pull {
            Pull::Down => PinState::High,
            Pull::Up | Pull::Floating => PinState::Low,
        };
        let relay_active = PinState::from(pins.relay_active_high);
        let settings = HeaterSettings::from(&config.heater);

        let acquisition = Acquisition::with_min_interval(board.sensor, timing.sensor_min_interval());
        let monitor = TempHumMonitor::new(acquisition)
            .with_interval(timing.sensor_interval())
            .with_policy(RetryPolicy {
                attempts: timing.retry_attempts,
                backoff: timing.retry_backoff(),
            });

        Ok(Self {
            switches: board.switches,
            enter: AntishakeDriver::with_settle(
                board.enter_button,
                button_active,
                timing.button_settle(),
            ),
            cancel: AntishakeDriver::with_settle(
                board.cancel_button,
                button_active,
                timing.button_settle(),
            ),
            ambient: AntishakeDriver::with_settle(
                board.ambient_light,
                PinState::from(pins.ambient_dark_high),
                timing.ambient_settle(),
            ),
            shutoff: DebounceState::new(false, timing.button_settle()),
            shutoff_pressed: false,
            monitor,
            heater: HeaterController::new(
                switch::Driver::new(board.heater_relay, relay_active)?,
                settings,
            ),
            lighting: LightController::new(switch::Driver::new(board.light_relay, relay_active)?),
            indicators: Indicators {
                heater_on: led::Driver::new(board.led_heater_on, PinState::High)?,
                low_temperature: led::Driver::new(board.led_low_temperature, PinState::High)?,
                light_on: led::Driver::new(board.led_light_on, PinState::High)?,
            },
            navigator: MenuNavigator::new(settings.min_temp_c, settings.max_temp_c),
            clock: board.clock,
            delay: board.delay,
            rtc: board.rtc,
            log: board.log,
            display: board.display,
            rotary: board.rotary,
            display_powered: None,
            last_view: None,
        })
    }

    pub fn heater(&self) -> &HeaterController<P::Output, Instant> {
        &self.heater
    }

    pub fn lighting(&self) -> &LightController<P::Output, Instant> {
        &self.lighting
    }

    pub fn navigator(&self) -> &MenuNavigator {
        &self.navigator
    }

    pub fn monitor(&self) -> &TempHumMonitor<P::Sensor, Instant> {
        &self.monitor
    }

    pub fn log(&self) -> &P::Log {
        &self.log
    }

    pub fn display(&self) -> &P::Display {
        &self.display
    }

    /// 一个控制周期
    ///
    /// 只有继电器、指示灯、开关读取失败会返回错误
    pub fn tick(&mut self) -> Result<()> {
        let at = self.rtc.date_time();

        if self.enter.just_pressed(&self.clock)? {
            let action = self.navigator.enter(self.heater.setpoint_c());
            self.handle_menu_action(action, at);
        }
        if self.cancel.just_pressed(&self.clock)? {
            let action = self.navigator.cancel();
            self.handle_menu_action(action, at);
        }

        let heater_switches = SwitchPosition::heater(&mut self.switches)?;
        let light_switches = SwitchPosition::light(&mut self.switches)?;
        let shutoff_raw = !self.switches.read_input(input::SHUTOFF_BUTTON)?;
        let shutoff = self.shutoff.update(shutoff_raw, &self.clock);
        if shutoff && !self.shutoff_pressed {
            let action = self.navigator.toggle_display();
            self.handle_menu_action(action, at);
        }
        self.shutoff_pressed = shutoff;

        match self
            .monitor
            .poll(&self.clock, &mut self.delay, &mut self.rtc, &mut self.log)
        {
            SensorOutcome::NotDue => {}
            SensorOutcome::Fresh(_) => {
                if self.heater.clear_safe_mode(heater_switches.selected()) {
                    let at = self.rtc.date_time();
                    self.log.log(system::TEMP_HUM, at, "Safe mode deactivated");
                }
            }
            SensorOutcome::Failed(err) => {
                if self.heater.enter_safe_mode(&self.clock) {
                    warn!(%err, "temperature/humidity sensor unavailable");
                    let at = self.rtc.date_time();
                    self.log.log(system::TEMP_HUM, at, "Safe mode activated");
                }
            }
        }

        // 重读可能阻塞了十几秒
        let at = self.rtc.date_time();
        let temperature = self.monitor.reading().temperature_c();
        self.heater.apply_switches(heater_switches.selected());
        self.heater
            .evaluate(temperature, &at, &self.clock, &mut self.log)?;

        let dark = self.ambient.state(&self.clock)?;
        self.lighting.apply_switches(light_switches.selected());
        self.lighting
            .evaluate(dark, &at, &self.clock, &mut self.log)?;

        let low = temperature.is_some_and(|t| t < self.heater.settings().min_temp_c);
        self.indicators.heater_on.set(self.heater.is_on())?;
        self.indicators.low_temperature.set(low)?;
        self.indicators.light_on.set(self.lighting.is_on())?;

        // 每个边沿都要送进导航器，卡位配对才不会错位
        if let Some((direction, edges)) = self.rotary.drain() {
            for _ in 0..edges {
                let action = self.navigator.rotate(direction);
                self.handle_menu_action(action, at);
            }
        }

        self.refresh_display(at);
        Ok(())
    }

    /// 校时并记录
    pub fn set_date_time(&mut self, value: DateTime) -> Result<()> {
        let before = self.rtc.date_time();
        self.rtc.set_date_time(value)?;
        self.log.log(
            system::RTC,
            value,
            format!("Date and time changed from \"{before}\" to \"{value}\""),
        );
        Ok(())
    }

    fn handle_menu_action(&mut self, action: MenuAction, at: DateTime) {
        match action {
            MenuAction::SetpointConfirmed(to) => {
                let from = self.heater.setpoint_c();
                self.heater.set_setpoint(to);
                let to = self.heater.setpoint_c();
                if from != to {
                    info!(from, to, "setpoint changed");
                    self.log.log(
                        system::MENU,
                        at,
                        format!("Setpoint changed from {from:.0} to {to:.0}"),
                    );
                }
            }
            MenuAction::Unavailable(item) => {
                self.log
                    .log(system::MENU, at, format!("{} is not available", item.label));
            }
            MenuAction::Ignored => {}
            other => debug!(?other, "menu"),
        }
    }

    fn status_view(&self, at: DateTime) -> StatusView {
        let menu = self.navigator.menu();
        let reading = self.monitor.reading();
        StatusView {
            at,
            heater_mode: self.heater.mode().name(),
            heater_on: self.heater.is_on(),
            setpoint_c: self.heater.setpoint_c(),
            temperature_c: reading.temperature_c(),
            humidity_pct: reading.humidity_pct(),
            light_mode: self.lighting.mode().name(),
            light_on: self.lighting.is_on(),
            heating_seconds: self.heater.total_on_seconds(),
            lighting_seconds: self.lighting.total_on_seconds(),
            previous_item: menu.previous().label,
            current_item: menu.current().label,
            next_item: menu.next().label,
            panel: self.navigator.panel(),
        }
    }

    /// 显示屏出错不影响控制，只记录警告
    fn refresh_display(&mut self, at: DateTime) {
        let powered = self.navigator.display_on();
        if self.display_powered != Some(powered) {
            if let Err(err) = self.display.set_power(powered) {
                warn!(%err, "display power switch failed");
                return;
            }
            self.display_powered = Some(powered);
            self.last_view = None;
        }
        if !powered {
            return;
        }
        let view = self.status_view(at);
        if self.last_view.as_ref() == Some(&view) {
            return;
        }
        match self.display.render(&view) {
            Ok(()) => self.last_view = Some(view),
            Err(err) => warn!(%err, "display render failed"),
        }
    }
}
