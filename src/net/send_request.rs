//! 客户端发起请求事件

use std::net::Ipv4Addr;

use super::id::EndpointId;
use super::net_world::NetWorld;
use crate::http::HttpRequest;
use crate::sim::{Event, Simulator, World};
use tracing::warn;

/// 事件：让客户端端点在此刻发出一条 HTTP 请求。
#[derive(Debug)]
pub struct SendRequest {
    pub from: EndpointId,
    pub request: HttpRequest,
    pub dst: Ipv4Addr,
    pub dst_port: u16,
}

impl Event for SendRequest {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let SendRequest {
            from,
            request,
            dst,
            dst_port,
        } = *self;
        let net = &mut NetWorld::downcast(world).net;
        let sent = net.with_endpoint(from, |ep, net| {
            ep.send_request(&request, dst, dst_port, sim, net)
        });
        match sent {
            Some(Ok(_)) => {}
            Some(Err(e)) => warn!(error = %e, "请求发送失败"),
            None => warn!(endpoint = ?from, "端点不存在"),
        }
    }
}
