pub mod acquisition;
pub mod controller;
pub mod heater;
pub mod lighting;
pub mod menu;
pub mod switches;
pub mod tracking;

pub use controller::{Board, Controller, Platform};
