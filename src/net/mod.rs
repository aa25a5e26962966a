//! 网络模块
//!
//! 端点、链路容器以及驱动它们的仿真事件。

mod counters;
mod deliver_frame;
mod endpoint;
mod id;
mod net_world;
mod network;
mod send_request;

pub use counters::{IdCounter, SeqCounter};
pub use deliver_frame::DeliverFrame;
pub use endpoint::{
    Endpoint, EndpointConfig, EndpointError, EndpointStats, Role, SendReport, MAX_MSS,
};
pub use id::{EndpointId, LinkId};
pub use net_world::NetWorld;
pub use network::Network;
pub use send_request::SendRequest;
