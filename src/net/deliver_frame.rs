//! 帧投递事件

use super::id::{EndpointId, LinkId};
use super::net_world::NetWorld;
use crate::sim::{Event, Simulator, World};
use crate::wire::Frame;
use tracing::debug;

/// 事件：链路时延结束，把帧交给登记的接收端点。
#[derive(Debug)]
pub struct DeliverFrame {
    pub link: LinkId,
    pub to: EndpointId,
    pub frame: Frame,
}

impl Event for DeliverFrame {
    #[tracing::instrument(
        level = "debug",
        skip(self, sim, world),
        fields(link = ?self.link, to = ?self.to, frame_bytes = self.frame.len())
    )]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverFrame { link, to, frame } = *self;
        debug!(now = %sim.now(), "📨 帧到达");
        NetWorld::downcast(world).net.deliver(link, to, frame, sim);
    }
}
