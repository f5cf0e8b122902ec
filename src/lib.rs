pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod event_log;
pub mod input_pin_wapper;
pub mod io_pin_wapper;
pub mod output_pin_wapper;
pub mod rtc;
pub mod sensor;
pub mod std_clock;
