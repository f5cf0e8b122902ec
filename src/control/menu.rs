use crate::display::Panel;
use crate::sensor::rotary::Direction;

/// 主菜单项编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuId {
    SetMinTemperature = 0,
    SetLightIntensity = 1,
    SetDateTime = 2,
    ShowHeatingTime = 3,
    ShowLightingTime = 4,
    TurnOffDisplay = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub id: MenuId,
    pub label: &'static str,
}

pub const MAIN_MENU: [MenuItem; 6] = [
    MenuItem {
        id: MenuId::SetMinTemperature,
        label: "Set min. temperature",
    },
    MenuItem {
        id: MenuId::SetLightIntensity,
        label: "Set light intensity",
    },
    MenuItem {
        id: MenuId::SetDateTime,
        label: "Set date/time",
    },
    MenuItem {
        id: MenuId::ShowHeatingTime,
        label: "Show heating time",
    },
    MenuItem {
        id: MenuId::ShowLightingTime,
        label: "Show lighting time",
    },
    MenuItem {
        id: MenuId::TurnOffDisplay,
        label: "Turn off display",
    },
];

/// 环形菜单，下标始终在`0..len`内
#[derive(Debug, Clone)]
pub struct Menu<const N: usize> {
    items: [MenuItem; N],
    index: usize,
}

impl Menu<6> {
    pub fn main() -> Self {
        Self::new(MAIN_MENU)
    }
}

impl<const N: usize> Menu<N> {
    pub fn new(items: [MenuItem; N]) -> Self {
        Self { items, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn forward(&mut self) -> usize {
        self.index = (self.index + 1) % N;
        self.index
    }

    pub fn backward(&mut self) -> usize {
        self.index = (self.index + N - 1) % N;
        self.index
    }

    pub fn previous(&self) -> &MenuItem {
        &self.items[(self.index + N - 1) % N]
    }

    pub fn current(&self) -> &MenuItem {
        &self.items[self.index]
    }

    pub fn next(&self) -> &MenuItem {
        &self.items[(self.index + 1) % N]
    }
}

/// 一次输入引起的结果，需要控制器处理的带数据返回
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    /// 没有任何变化
    Ignored,
    /// 显示屏被唤醒
    Woke,
    Moved(usize),
    /// 修改中的设定温度
    Draft(f32),
    Opened(Panel),
    /// 回到状态页
    Closed,
    SetpointConfirmed(f32),
    Unavailable(MenuItem),
    DisplayOff,
}

/// 旋钮、按键驱动的菜单导航
pub struct MenuNavigator {
    menu: Menu<6>,
    panel: Panel,
    display_on: bool,
    /// 一个卡位产生两个边沿，第一个移动，第二个只复位
    moved: bool,
    min_setpoint: f32,
    max_setpoint: f32,
}

impl MenuNavigator {
    pub fn new(min_setpoint: f32, max_setpoint: f32) -> Self {
        Self {
            menu: Menu::main(),
            panel: Panel::Status,
            display_on: true,
            moved: false,
            min_setpoint,
            max_setpoint,
        }
    }

    pub fn menu(&self) -> &Menu<6> {
        &self.menu
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    /// 显示屏关闭时唤醒，返回是否唤醒了
    fn wake(&mut self) -> bool {
        if self.display_on {
            return false;
        }
        self.display_on = true;
        true
    }

    pub fn rotate(&mut self, direction: Direction) -> MenuAction {
        if self.moved {
            self.moved = false;
            return MenuAction::Ignored;
        }
        self.moved = true;

        if self.wake() {
            return MenuAction::Woke;
        }
        match self.panel {
            Panel::Status => MenuAction::Moved(match direction {
                Direction::Clockwise => self.menu.forward(),
                Direction::CounterClockwise => self.menu.backward(),
            }),
            Panel::EditSetpoint { draft } => {
                let step = match direction {
                    Direction::Clockwise => 1.0,
                    Direction::CounterClockwise => -1.0,
                };
                let draft = (draft + step).clamp(self.min_setpoint, self.max_setpoint);
                self.panel = Panel::EditSetpoint { draft };
                MenuAction::Draft(draft)
            }
            Panel::HeatingTime | Panel::LightingTime => MenuAction::Ignored,
        }
    }

    /// 确认键
    ///
    /// - `setpoint_c`: 当前设定温度，进入编辑时作为初值
    pub fn enter(&mut self, setpoint_c: f32) -> MenuAction {
        if self.wake() {
            return MenuAction::Woke;
        }
        match self.panel {
            Panel::Status => {
                let item = *self.menu.current();
                match item.id {
                    MenuId::SetMinTemperature => {
                        self.panel = Panel::EditSetpoint { draft: setpoint_c };
                        MenuAction::Opened(self.panel)
                    }
                    MenuId::SetLightIntensity | MenuId::SetDateTime => {
                        MenuAction::Unavailable(item)
                    }
                    MenuId::ShowHeatingTime => {
                        self.panel = Panel::HeatingTime;
                        MenuAction::Opened(self.panel)
                    }
                    MenuId::ShowLightingTime => {
                        self.panel = Panel::LightingTime;
                        MenuAction::Opened(self.panel)
                    }
                    MenuId::TurnOffDisplay => {
                        self.display_on = false;
                        MenuAction::DisplayOff
                    }
                }
            }
            Panel::EditSetpoint { draft } => {
                self.panel = Panel::Status;
                MenuAction::SetpointConfirmed(draft)
            }
            Panel::HeatingTime | Panel::LightingTime => {
                self.panel = Panel::Status;
                MenuAction::Closed
            }
        }
    }

    /// 取消键，编辑中的设定温度被丢弃
    pub fn cancel(&mut self) -> MenuAction {
        if self.wake() {
            return MenuAction::Woke;
        }
        if self.panel == Panel::Status {
            return MenuAction::Ignored;
        }
        self.panel = Panel::Status;
        MenuAction::Closed
    }

    /// 关屏按键
    pub fn toggle_display(&mut self) -> MenuAction {
        if self.wake() {
            return MenuAction::Woke;
        }
        self.display_on = false;
        self.panel = Panel::Status;
        MenuAction::DisplayOff
    }
}
