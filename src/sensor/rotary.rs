use std::sync::atomic::{AtomicI32, Ordering};

/// 旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 顺时针方向
    Clockwise,
    /// 逆时针方向
    CounterClockwise,
}

/// 旋转编码器边沿计数
///
/// 中断回调每个边沿调用一次`signal`，顺时针加一、逆时针减一；
/// 主循环调用`drain`一次取走全部未处理的边沿。
/// 一个周期内来回抖动的边沿互相抵消。
#[derive(Debug, Default)]
pub struct EdgeEvents {
    pending: AtomicI32,
}

impl EdgeEvents {
    pub const fn new() -> Self {
        Self {
            pending: AtomicI32::new(0),
        }
    }

    /// A相电平变化时调用（中断上下文）
    ///
    /// - `a`: 变化后的A相电平
    /// - `b`: 此刻B相电平
    pub fn signal(&self, a: bool, b: bool) {
        let step = match quadrature(a, b) {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        };
        self.pending.fetch_add(step, Ordering::AcqRel);
    }

    /// 取走所有待处理的边沿（主循环），返回方向和边沿数
    pub fn drain(&self) -> Option<(Direction, u32)> {
        match self.pending.swap(0, Ordering::AcqRel) {
            0 => None,
            n if n > 0 => Some((Direction::Clockwise, n.unsigned_abs())),
            n => Some((Direction::CounterClockwise, n.unsigned_abs())),
        }
    }
}

/// A相变化后A、B电平不同为顺时针，相同为逆时针
pub fn quadrature(a: bool, b: bool) -> Direction {
    if a != b {
        Direction::Clockwise
    } else {
        Direction::CounterClockwise
    }
}
