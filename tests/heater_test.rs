mod common;

use std::time::{Duration, Instant};

use common::{FakeOutput, Rig, ScriptedSensor, afternoon, celsius, night};
use domo_hedgie::control::heater::{HeaterController, HeaterMode, HeaterSettings};
use domo_hedgie::control::switches::ModeSelector;
use domo_hedgie::error::SensorError;
use domo_hedgie::event_log::{MemoryLog, system};
use domo_hedgie::sensor::multiplexer::input;
use domo_hedgie::sensor::switch;
use domo_hedgie::std_clock::ManualClock;
use embedded_hal::digital::PinState;
use pretty_assertions::assert_eq;

fn heater(relay: &FakeOutput) -> HeaterController<FakeOutput, Instant> {
    let relay = switch::Driver::new(relay.clone(), PinState::High).unwrap();
    HeaterController::new(relay, HeaterSettings::default())
}

fn temperatures() -> impl Iterator<Item = f32> {
    (0..=80).map(|step| 10.0 + step as f32 * 0.25)
}

#[test]
fn auto_heats_only_below_setpoint() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    heater.set_setpoint(25.0);
    heater.apply_switches(Some(ModeSelector::Auto));

    for t in temperatures() {
        heater
            .evaluate(Some(t), &afternoon(), &clock, &mut log)
            .unwrap();
        assert_eq!(heater.is_on(), 25.0 > t, "temperature {t}");
        assert_eq!(relay.is_high(), heater.is_on());
    }
}

#[test]
fn manual_on_respects_safety_ceiling() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    heater.apply_switches(Some(ModeSelector::On));

    for t in temperatures() {
        heater
            .evaluate(Some(t), &afternoon(), &clock, &mut log)
            .unwrap();
        assert_eq!(heater.is_on(), t < 30.0, "temperature {t}");
    }
}

#[test]
fn off_mode_forces_relay_off() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    heater.apply_switches(Some(ModeSelector::On));
    heater
        .evaluate(Some(15.0), &afternoon(), &clock, &mut log)
        .unwrap();
    assert!(heater.is_on());

    heater.apply_switches(Some(ModeSelector::Off));
    heater
        .evaluate(Some(15.0), &afternoon(), &clock, &mut log)
        .unwrap();
    assert!(!heater.is_on());
    assert_eq!(log.messages(system::HEATER), vec!["ON#ON#0.00", "OFF#OFF#0.00"]);
}

#[test]
fn turning_on_twice_writes_and_logs_once() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    let writes = relay.writes();

    assert!(heater.turn_on(&afternoon(), &clock, &mut log).unwrap());
    assert!(!heater.turn_on(&afternoon(), &clock, &mut log).unwrap());

    assert_eq!(relay.writes(), writes + 1);
    assert_eq!(log.records().len(), 1);
}

#[test]
fn auto_scenario_logs_transitions() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    heater.set_setpoint(25.0);
    heater.apply_switches(Some(ModeSelector::Auto));

    heater
        .evaluate(Some(22.0), &afternoon(), &clock, &mut log)
        .unwrap();
    assert!(heater.is_on());
    clock.advance(Duration::from_millis(90_400));
    heater
        .evaluate(Some(26.0), &afternoon(), &clock, &mut log)
        .unwrap();
    assert!(!heater.is_on());

    assert_eq!(
        log.lines(),
        vec![
            "HEATER;07/05/2016 14:30:00;AUTO#ON#0.00".to_string(),
            "HEATER;07/05/2016 14:30:00;AUTO#OFF#90.00".to_string(),
        ]
    );
    assert_eq!(heater.total_on_seconds(), 90.0);
}

#[test]
fn on_time_only_grows_while_heating() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    heater.apply_switches(Some(ModeSelector::On));

    heater.evaluate(Some(20.0), &afternoon(), &clock, &mut log).unwrap();
    for _ in 0..10 {
        clock.advance(Duration::from_millis(700));
        heater.evaluate(Some(20.0), &afternoon(), &clock, &mut log).unwrap();
    }
    // 7秒整，余数不会丢
    assert_eq!(heater.total_on_seconds(), 7.0);

    heater.apply_switches(Some(ModeSelector::Off));
    heater.evaluate(Some(20.0), &afternoon(), &clock, &mut log).unwrap();
    clock.advance(Duration::from_secs(60));
    heater.evaluate(Some(20.0), &afternoon(), &clock, &mut log).unwrap();
    assert_eq!(heater.total_on_seconds(), 7.0);
}

#[test]
fn safe_mode_night_duty_cycle() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    let at = night();
    assert!(at.is_night());

    assert!(heater.enter_safe_mode(&clock));
    clock.advance(Duration::from_millis(1_800_000));
    heater.evaluate(Some(15.0), &at, &clock, &mut log).unwrap();
    assert!(!heater.is_on());

    clock.advance(Duration::from_millis(1));
    heater.evaluate(Some(15.0), &at, &clock, &mut log).unwrap();
    assert!(heater.is_on());
    assert_eq!(heater.safe_timer(), Duration::ZERO);

    clock.advance(Duration::from_millis(3_600_000));
    heater.evaluate(Some(15.0), &at, &clock, &mut log).unwrap();
    assert!(heater.is_on());

    clock.advance(Duration::from_millis(1));
    heater.evaluate(Some(15.0), &at, &clock, &mut log).unwrap();
    assert!(!heater.is_on());

    assert_eq!(
        log.messages(system::HEATER),
        vec!["SAFE#ON#0.00", "SAFE#OFF#3600.00"]
    );
}

#[test]
fn safe_mode_day_duty_cycle_accumulates_ticks() {
    let clock = ManualClock::new();
    let mut log = MemoryLog::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    let at = afternoon();

    heater.enter_safe_mode(&clock);
    // 每分钟检查一次，7200000ms之后的第一次检查打开
    for _ in 0..120 {
        clock.advance(Duration::from_secs(60));
        heater.evaluate(None, &at, &clock, &mut log).unwrap();
        assert!(!heater.is_on());
    }
    clock.advance(Duration::from_secs(60));
    heater.evaluate(None, &at, &clock, &mut log).unwrap();
    assert!(heater.is_on());
}

#[test]
fn safe_mode_ignores_switches() {
    let clock = ManualClock::new();
    let relay = FakeOutput::default();
    let mut heater = heater(&relay);
    heater.apply_switches(Some(ModeSelector::Auto));
    heater.enter_safe_mode(&clock);

    for selected in [ModeSelector::Auto, ModeSelector::Off, ModeSelector::On] {
        heater.apply_switches(Some(selected));
        assert_eq!(heater.mode(), HeaterMode::Safe);
    }
    assert!(heater.clear_safe_mode(Some(ModeSelector::On)));
    assert_eq!(heater.mode(), HeaterMode::On);
}

#[test]
fn persistent_sensor_failure_enters_sticky_safe_mode() {
    let sensor = ScriptedSensor::new(Err(SensorError::Timeout("response")));
    let mut rig = Rig::new(sensor, afternoon());
    rig.switches.close(input::HEATER_AUTO, true);

    rig.tick();
    assert_eq!(rig.controller.heater().mode(), HeaterMode::Safe);
    // 一次正常读取加5次强制重读，每次重读前等待3000ms
    assert_eq!(rig.sensor.reads(), 6);
    assert_eq!(rig.clock.uptime(), Duration::from_secs(15));

    let mut expected = vec!["Timeout error occured"; 6];
    expected.push("Safe mode activated");
    assert_eq!(rig.controller.log().messages(system::TEMP_HUM), expected);

    rig.switches.close(input::HEATER_AUTO, false);
    rig.switches.close(input::HEATER_ON, true);
    rig.clock.advance(Duration::from_secs(1));
    rig.tick();
    assert_eq!(rig.controller.heater().mode(), HeaterMode::Safe);

    // 下一次定时读取成功后交还给开关
    rig.sensor.set_steady(Ok(celsius(20.0)));
    rig.clock.advance(Duration::from_secs(60));
    rig.tick();
    assert_eq!(rig.controller.heater().mode(), HeaterMode::On);
    assert!(rig.controller.heater().is_on());
    assert_eq!(
        rig.controller
            .log()
            .messages(system::TEMP_HUM)
            .last()
            .copied(),
        Some("Safe mode deactivated")
    );
}

#[test]
fn safe_mode_is_logged_only_on_entry() {
    let sensor = ScriptedSensor::new(Err(SensorError::Checksum));
    let mut rig = Rig::new(sensor, afternoon());

    rig.tick();
    rig.clock.advance(Duration::from_secs(60));
    rig.tick();

    let log = rig.controller.log();
    let activated = log
        .messages(system::TEMP_HUM)
        .into_iter()
        .filter(|m| *m == "Safe mode activated")
        .count();
    assert_eq!(activated, 1);
    assert_eq!(
        log.messages(system::TEMP_HUM)
            .into_iter()
            .filter(|m| *m == "Checksum error occured")
            .count(),
        12
    );
}
