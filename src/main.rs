use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use domo_hedgie::config::Config;
use domo_hedgie::control::{Board, Controller, Platform};
use domo_hedgie::display::TracingDisplay;
use domo_hedgie::event_log::WriterLog;
use domo_hedgie::input_pin_wapper::{InputPinWapper, Pull};
use domo_hedgie::io_pin_wapper::IoPinWapper;
use domo_hedgie::output_pin_wapper::OutputPinWapper;
use domo_hedgie::rtc::SystemRtc;
use domo_hedgie::sensor::dht11::DHT11;
use domo_hedgie::sensor::multiplexer::Multiplexer;
use domo_hedgie::sensor::rotary::EdgeEvents;
use domo_hedgie::std_clock::{StdClock, StdDelay};
use embedded_hal::digital::{InputPin, PinState};
use rppal::gpio::Gpio;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 树莓派上的硬件组合
struct RaspberryPi;

impl Platform for RaspberryPi {
    type Switches = Multiplexer<OutputPinWapper, InputPinWapper, StdDelay, 3>;
    type Input = InputPinWapper;
    type Output = OutputPinWapper;
    type Sensor = DHT11<IoPinWapper, StdClock>;
    type Clock = StdClock;
    type Delay = StdDelay;
    type Rtc = SystemRtc;
    type Log = WriterLog<Box<dyn Write + Send>>;
    type Display = TracingDisplay;
}

fn event_sink(config: &Config) -> anyhow::Result<Box<dyn Write + Send>> {
    Ok(match &config.event_log {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(io::stdout()),
    })
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 第一个参数为配置文件路径，不传则全部使用默认值
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let pins = &config.pins;
    let gpio = Gpio::new()?;

    let switches = Multiplexer::new(
        OutputPinWapper::open_all(&gpio, pins.mux_select)?,
        InputPinWapper::open(&gpio, pins.mux_output, Pull::Up)?,
        StdDelay,
    )
    .with_settle(config.timing.mux_settle());

    // A相的中断回调持有B相针脚，只累加边沿计数
    let rotary = Arc::new(EdgeEvents::new());
    let mut rotary_a = InputPinWapper::open(&gpio, pins.rotary_a, Pull::Up)?;
    let mut rotary_b = InputPinWapper::open(&gpio, pins.rotary_b, Pull::Up)?;
    let events = rotary.clone();
    rotary_a.on_edge(None, move |a| {
        events.signal(a, rotary_b.is_high().unwrap_or(false));
    })?;

    let relay_off = PinState::from(!pins.relay_active_high);
    let board = Board::<RaspberryPi> {
        switches,
        enter_button: InputPinWapper::open(&gpio, pins.enter_button, pins.button_pull)?,
        cancel_button: InputPinWapper::open(&gpio, pins.cancel_button, pins.button_pull)?,
        ambient_light: InputPinWapper::open(&gpio, pins.ambient_light, Pull::Floating)?,
        heater_relay: OutputPinWapper::open(&gpio, pins.heater_relay, relay_off)?,
        light_relay: OutputPinWapper::open(&gpio, pins.light_relay, relay_off)?,
        led_heater_on: OutputPinWapper::open(&gpio, pins.led_heater_on, PinState::Low)?,
        led_low_temperature: OutputPinWapper::open(
            &gpio,
            pins.led_low_temperature,
            PinState::Low,
        )?,
        led_light_on: OutputPinWapper::open(&gpio, pins.led_light_on, PinState::Low)?,
        sensor: DHT11::new(IoPinWapper::open(&gpio, pins.dht11)?, StdClock),
        clock: StdClock,
        delay: StdDelay,
        rtc: SystemRtc::new(),
        log: WriterLog::new(event_sink(&config)?),
        display: TracingDisplay::default(),
        rotary,
    };
    let mut controller = Controller::new(board, &config)?;
    info!(tick = ?config.timing.tick(), "controller started");

    loop {
        let started = Instant::now();
        controller.tick()?;
        thread::sleep(config.timing.tick().saturating_sub(started.elapsed()));
    }
}
