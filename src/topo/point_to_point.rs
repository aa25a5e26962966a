//! 点对点拓扑构建
//!
//! 拓扑结构：client --uplink--> server，server --downlink--> client

use std::net::Ipv4Addr;

use tracing::info;

use crate::net::{Endpoint, EndpointId, LinkId, NetWorld, Role, SendRequest};
use crate::sim::{ScenarioError, ScenarioSpec, SimTime, Simulator};

/// 构建结果：各端点与链路的标识
#[derive(Debug, Clone, Copy)]
pub struct Exchange {
    pub client: EndpointId,
    pub server: EndpointId,
    pub uplink: LinkId,
    pub downlink: LinkId,
    pub server_addr: Ipv4Addr,
    pub server_port: u16,
}

/// 由场景种子和链路序号派生每条链路自己的种子
pub fn link_seed(seed: u64, link_index: u64) -> u64 {
    seed ^ link_index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// 按场景创建两个端点和两条链路并完成连接。任何配置错误都会中止构建。
pub fn build_exchange(
    world: &mut NetWorld,
    spec: &ScenarioSpec,
) -> Result<Exchange, ScenarioError> {
    let net = &mut world.net;

    let client = net.add_endpoint(|id| {
        Endpoint::new(id, Role::Client, &spec.client, spec.server.initial_seq).map_err(|source| {
            ScenarioError::Endpoint {
                name: spec.client.name.clone(),
                source,
            }
        })
    })?;
    let server = net.add_endpoint(|id| {
        Endpoint::new(id, Role::Server, &spec.server, spec.client.initial_seq).map_err(|source| {
            ScenarioError::Endpoint {
                name: spec.server.name.clone(),
                source,
            }
        })
    })?;

    let uplink = net.add_link("uplink", spec.uplink.clone(), link_seed(spec.seed, 0));
    let downlink = net.add_link("downlink", spec.downlink.clone(), link_seed(spec.seed, 1));

    for (link, receiver, name) in [(uplink, server, "uplink"), (downlink, client, "downlink")] {
        net.connect(link, receiver, SimTime::ZERO)
            .map_err(|source| ScenarioError::Link {
                name: name.to_string(),
                source,
            })?;
    }
    net.attach_uplink(client, uplink);
    net.attach_uplink(server, downlink);

    let (server_addr, server_port) = net
        .endpoint(server)
        .map(|ep| (ep.addr(), ep.port()))
        .unwrap_or((Ipv4Addr::UNSPECIFIED, spec.server.port));

    info!(
        client = %spec.client.addr,
        server = %server_addr,
        seed = spec.seed,
        "构建点对点拓扑: client <-> server"
    );

    Ok(Exchange {
        client,
        server,
        uplink,
        downlink,
        server_addr,
        server_port,
    })
}

/// 在 `start_ms` 调度客户端请求
pub fn schedule_request(sim: &mut Simulator, ex: &Exchange, spec: &ScenarioSpec) {
    sim.schedule(
        SimTime::from_millis(spec.start_ms),
        SendRequest {
            from: ex.client,
            request: spec.request.to_request(),
            dst: ex.server_addr,
            dst_port: ex.server_port,
        },
    );
}
