#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;

use domo_hedgie::config::Config;
use domo_hedgie::control::{Board, Controller, Platform};
use domo_hedgie::display::{DisplayDriver, StatusView};
use domo_hedgie::error::{Result, SensorError};
use domo_hedgie::event_log::MemoryLog;
use domo_hedgie::rtc::{DateTime, FixedRtc};
use domo_hedgie::sensor::multiplexer::SwitchBank;
use domo_hedgie::sensor::rotary::EdgeEvents;
use domo_hedgie::sensor::{Measurement, TempHumSensor};
use domo_hedgie::std_clock::{ManualClock, ManualDelay};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// 模式开关：所有线默认高电平（无效）
#[derive(Clone)]
pub struct FakeSwitchBank(Rc<RefCell<[bool; 8]>>);

impl Default for FakeSwitchBank {
    fn default() -> Self {
        Self(Rc::new(RefCell::new([true; 8])))
    }
}

impl FakeSwitchBank {
    /// 接通（拉低）或断开某根线
    pub fn close(&self, index: u8, closed: bool) {
        self.0.borrow_mut()[usize::from(index)] = !closed;
    }
}

impl SwitchBank for FakeSwitchBank {
    fn read_input(&mut self, index: u8) -> Result<bool> {
        Ok(self.0.borrow()[usize::from(index)])
    }
}

#[derive(Clone, Default)]
pub struct FakeInput(Rc<Cell<bool>>);

impl FakeInput {
    pub fn high() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn set(&self, high: bool) {
        self.0.set(high);
    }
}

impl ErrorType for FakeInput {
    type Error = Infallible;
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> std::result::Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> std::result::Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

/// 记录电平和写入次数的输出针脚
#[derive(Clone, Default)]
pub struct FakeOutput {
    level: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl FakeOutput {
    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl ErrorType for FakeOutput {
    type Error = Infallible;
}

impl OutputPin for FakeOutput {
    fn set_low(&mut self) -> std::result::Result<(), Infallible> {
        self.level.set(false);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn set_high(&mut self) -> std::result::Result<(), Infallible> {
        self.level.set(true);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// 按脚本返回结果的温湿度传感器，脚本用完后一直返回`steady`
#[derive(Clone)]
pub struct ScriptedSensor {
    queued: Rc<RefCell<VecDeque<std::result::Result<Measurement, SensorError>>>>,
    steady: Rc<Cell<std::result::Result<Measurement, SensorError>>>,
    reads: Rc<Cell<usize>>,
}

impl ScriptedSensor {
    pub fn new(steady: std::result::Result<Measurement, SensorError>) -> Self {
        Self {
            queued: Rc::default(),
            steady: Rc::new(Cell::new(steady)),
            reads: Rc::default(),
        }
    }

    pub fn push(&self, result: std::result::Result<Measurement, SensorError>) {
        self.queued.borrow_mut().push_back(result);
    }

    pub fn set_steady(&self, result: std::result::Result<Measurement, SensorError>) {
        self.steady.set(result);
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl TempHumSensor for ScriptedSensor {
    fn read(&mut self) -> std::result::Result<Measurement, SensorError> {
        self.reads.set(self.reads.get() + 1);
        self.queued
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.steady.get())
    }
}

#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub powered: Rc<Cell<bool>>,
    pub views: Rc<RefCell<Vec<StatusView>>>,
}

impl RecordingDisplay {
    pub fn last(&self) -> Option<StatusView> {
        self.views.borrow().last().cloned()
    }
}

impl DisplayDriver for RecordingDisplay {
    fn set_power(&mut self, on: bool) -> Result<()> {
        self.powered.set(on);
        Ok(())
    }

    fn render(&mut self, view: &StatusView) -> Result<()> {
        self.views.borrow_mut().push(view.clone());
        Ok(())
    }
}

pub struct Bench;

impl Platform for Bench {
    type Switches = FakeSwitchBank;
    type Input = FakeInput;
    type Output = FakeOutput;
    type Sensor = ScriptedSensor;
    type Clock = ManualClock;
    type Delay = ManualDelay;
    type Rtc = FixedRtc;
    type Log = MemoryLog;
    type Display = RecordingDisplay;
}

pub fn celsius(temperature_c: f32) -> Measurement {
    Measurement {
        temperature_c,
        humidity_pct: 50.0,
    }
}

pub fn afternoon() -> DateTime {
    DateTime::new(7, 5, 2016, 14, 30, 0)
}

pub fn night() -> DateTime {
    DateTime::new(7, 5, 2016, 22, 45, 0)
}

/// 控制器和所有假硬件的句柄
pub struct Rig {
    pub controller: Controller<Bench>,
    pub switches: FakeSwitchBank,
    pub enter: FakeInput,
    pub cancel: FakeInput,
    pub ambient: FakeInput,
    pub heater_relay: FakeOutput,
    pub light_relay: FakeOutput,
    pub led_heater_on: FakeOutput,
    pub led_low_temperature: FakeOutput,
    pub led_light_on: FakeOutput,
    pub sensor: ScriptedSensor,
    pub clock: ManualClock,
    pub rtc: FixedRtc,
    pub display: RecordingDisplay,
    pub rotary: Arc<EdgeEvents>,
}

impl Rig {
    pub fn new(sensor: ScriptedSensor, at: DateTime) -> Self {
        let switches = FakeSwitchBank::default();
        let enter = FakeInput::high();
        let cancel = FakeInput::high();
        let ambient = FakeInput::default();
        let heater_relay = FakeOutput::default();
        let light_relay = FakeOutput::default();
        let led_heater_on = FakeOutput::default();
        let led_low_temperature = FakeOutput::default();
        let led_light_on = FakeOutput::default();
        let clock = ManualClock::new();
        let rtc = FixedRtc::new(at);
        let display = RecordingDisplay::default();
        let rotary = Arc::new(EdgeEvents::new());

        let board = Board::<Bench> {
            switches: switches.clone(),
            enter_button: enter.clone(),
            cancel_button: cancel.clone(),
            ambient_light: ambient.clone(),
            heater_relay: heater_relay.clone(),
            light_relay: light_relay.clone(),
            led_heater_on: led_heater_on.clone(),
            led_low_temperature: led_low_temperature.clone(),
            led_light_on: led_light_on.clone(),
            sensor: sensor.clone(),
            clock: clock.clone(),
            delay: clock.delay(),
            rtc: rtc.clone(),
            log: MemoryLog::new(),
            display: display.clone(),
            rotary: rotary.clone(),
        };
        let controller = Controller::new(board, &Config::default()).unwrap();

        Self {
            controller,
            switches,
            enter,
            cancel,
            ambient,
            heater_relay,
            light_relay,
            led_heater_on,
            led_low_temperature,
            led_light_on,
            sensor,
            clock,
            rtc,
            display,
            rotary,
        }
    }

    pub fn tick(&mut self) {
        self.controller.tick().unwrap();
    }

    pub fn press_enter(&mut self) {
        self.press(self.enter.clone());
    }

    pub fn press_cancel(&mut self) {
        self.press(self.cancel.clone());
    }

    /// 按一次按键：按下保持超过消抖时间，再松开保持超过消抖时间
    fn press(&mut self, button: FakeInput) {
        button.set(false);
        self.tick();
        self.clock.advance(std::time::Duration::from_millis(10));
        self.tick();
        button.set(true);
        self.tick();
        self.clock.advance(std::time::Duration::from_millis(10));
        self.tick();
    }

    /// 转过一个卡位（两个边沿）
    pub fn turn(&mut self, clockwise: bool) {
        for a in [true, false] {
            let b = if clockwise { !a } else { a };
            self.rotary.signal(a, b);
            self.tick();
        }
    }

    /// 两次周期之间连续转过多个卡位
    pub fn spin(&mut self, detents: usize, clockwise: bool) {
        for _ in 0..detents {
            for a in [true, false] {
                self.rotary.signal(a, if clockwise { !a } else { a });
            }
        }
        self.tick();
    }
}
