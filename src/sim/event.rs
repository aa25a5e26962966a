//! 事件 trait

use super::simulator::Simulator;
use super::world::World;

/// 可调度的仿真事件。`self: Box<Self>` 让事件在执行时按值交出自己携带的数据
/// （例如在途的帧）。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
