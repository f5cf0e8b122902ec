use crate::error::Result;
use crate::sensor::multiplexer::{SwitchBank, input};

/// 三段式模式开关选中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelector {
    Auto,
    Off,
    On,
}

impl ModeSelector {
    pub fn name(self) -> &'static str {
        match self {
            ModeSelector::Auto => "AUTO",
            ModeSelector::Off => "OFF",
            ModeSelector::On => "ON",
        }
    }
}

/// 一个模式开关三根线的状态，true为该线有效（低电平）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchPosition {
    pub auto: bool,
    pub off: bool,
    pub on: bool,
}

impl SwitchPosition {
    /// 读取三根开关线，开关接通时线被拉低
    pub fn read<S: SwitchBank>(bank: &mut S, lines: [u8; 3]) -> Result<Self> {
        let [auto, off, on] = lines;
        Ok(Self {
            auto: !bank.read_input(auto)?,
            off: !bank.read_input(off)?,
            on: !bank.read_input(on)?,
        })
    }

    pub fn heater<S: SwitchBank>(bank: &mut S) -> Result<Self> {
        Self::read(
            bank,
            [input::HEATER_AUTO, input::HEATER_OFF, input::HEATER_ON],
        )
    }

    pub fn light<S: SwitchBank>(bank: &mut S) -> Result<Self> {
        Self::read(bank, [input::LIGHT_AUTO, input::LIGHT_OFF, input::LIGHT_ON])
    }

    /// 多根线同时有效时按AUTO > OFF > ON取一个，都无效时返回None
    pub fn selected(&self) -> Option<ModeSelector> {
        if self.auto {
            Some(ModeSelector::Auto)
        } else if self.off {
            Some(ModeSelector::Off)
        } else if self.on {
            Some(ModeSelector::On)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Levels([bool; 8]);

    impl SwitchBank for Levels {
        fn read_input(&mut self, index: u8) -> Result<bool> {
            Ok(self.0[usize::from(index)])
        }
    }

    #[test]
    fn lines_are_active_low() {
        let mut levels = [true; 8];
        levels[usize::from(input::HEATER_ON)] = false;
        levels[usize::from(input::LIGHT_AUTO)] = false;
        let mut bank = Levels(levels);

        let heater = SwitchPosition::heater(&mut bank).unwrap();
        assert_eq!(heater.selected(), Some(ModeSelector::On));
        let light = SwitchPosition::light(&mut bank).unwrap();
        assert_eq!(light.selected(), Some(ModeSelector::Auto));
    }

    #[test]
    fn ambiguous_positions_follow_priority() {
        let all = SwitchPosition {
            auto: true,
            off: true,
            on: true,
        };
        assert_eq!(all.selected(), Some(ModeSelector::Auto));
        let off_on = SwitchPosition {
            auto: false,
            off: true,
            on: true,
        };
        assert_eq!(off_on.selected(), Some(ModeSelector::Off));
        assert_eq!(SwitchPosition::default().selected(), None);
    }
}
