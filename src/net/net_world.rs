//! 网络世界实现

use super::network::Network;
use crate::sim::World;
use std::any::Any;

/// 持有 `Network` 的仿真世界，事件通过向下转型拿到它。
#[derive(Default)]
pub struct NetWorld {
    pub net: Network,
}

impl NetWorld {
    pub(crate) fn downcast(world: &mut dyn World) -> &mut NetWorld {
        world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld")
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
