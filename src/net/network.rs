//! 网络：端点与链路的容器
//!
//! 端点存放在 `Option` 槽里。处理到达帧时先把端点取出，交给它 `&mut Network`
//! 用于回发，处理完再放回；因此每个端点的重组缓冲区只有它自己在写。

use tracing::{debug, info, trace, warn};

use super::endpoint::Endpoint;
use super::id::{EndpointId, LinkId};
use crate::link::{LinkConfig, LinkError, SendOutcome, SimulatedLink};
use crate::sim::{SimTime, Simulator};
use crate::trace::{TraceEvent, TraceEventKind, TraceLog, TraceSegment};
use crate::wire::Frame;

#[derive(Default)]
pub struct Network {
    endpoints: Vec<Option<Endpoint>>,
    links: Vec<SimulatedLink>,
    /// 可选的帧级事件记录
    pub trace: Option<TraceLog>,
}

impl Network {
    /// 加入一个端点。端点的 id 由构造闭包拿到，保证与槽位一致。
    pub fn add_endpoint<E>(
        &mut self,
        build: impl FnOnce(EndpointId) -> Result<Endpoint, E>,
    ) -> Result<EndpointId, E> {
        let id = EndpointId(self.endpoints.len());
        let ep = build(id)?;
        info!(
            endpoint = ?id,
            name = %ep.name(),
            addr = %ep.addr(),
            port = ep.port(),
            "➕ 加入端点"
        );
        self.endpoints.push(Some(ep));
        Ok(id)
    }

    /// 加入一条未连接的单向链路，随机源由 `seed` 确定。
    pub fn add_link(&mut self, name: impl Into<String>, config: LinkConfig, seed: u64) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(SimulatedLink::with_seed(id, name, config, seed));
        id
    }

    /// 连接链路到接收端点（Unconnected -> Connected）。
    pub fn connect(
        &mut self,
        link: LinkId,
        receiver: EndpointId,
        now: SimTime,
    ) -> Result<(), LinkError> {
        let l = self
            .links
            .get_mut(link.0)
            .ok_or(LinkError::UnknownLink(link.0))?;
        l.connect(receiver)?;
        if let (Some(t), Some(p)) = (&mut self.trace, l.profile()) {
            t.push(TraceEvent {
                t_ns: now.0,
                link: Some(link.0),
                frame_bytes: None,
                kind: TraceEventKind::LinkUp {
                    name: l.name().to_string(),
                    medium: p.medium.to_string(),
                    rate_bps: p.rate_bps,
                    distance_m: p.distance_m,
                    loss: p.loss,
                },
            });
        }
        Ok(())
    }

    /// 指定端点的出口链路
    pub fn attach_uplink(&mut self, endpoint: EndpointId, link: LinkId) {
        if let Some(Some(ep)) = self.endpoints.get_mut(endpoint.0) {
            ep.set_uplink(link);
        }
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(id.0).and_then(Option::as_ref)
    }

    pub fn endpoint_mut(&mut self, id: EndpointId) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn link(&self, id: LinkId) -> Option<&SimulatedLink> {
        self.links.get(id.0)
    }

    pub fn links(&self) -> &[SimulatedLink] {
        &self.links
    }

    /// 暂时取出端点执行 `f`，期间 `f` 可以通过 `&mut Network` 发送帧。
    pub fn with_endpoint<R>(
        &mut self,
        id: EndpointId,
        f: impl FnOnce(&mut Endpoint, &mut Network) -> R,
    ) -> Option<R> {
        let mut ep = self.endpoints.get_mut(id.0)?.take()?;
        let r = f(&mut ep, self);
        self.endpoints[id.0] = Some(ep);
        Some(r)
    }

    pub(crate) fn record(
        &mut self,
        t: SimTime,
        link: Option<LinkId>,
        frame_bytes: Option<usize>,
        kind: TraceEventKind,
    ) {
        if let Some(log) = &mut self.trace {
            log.push(TraceEvent {
                t_ns: t.0,
                link: link.map(|l| l.0),
                frame_bytes,
                kind,
            });
        }
    }

    /// 把一帧交给链路。结果只进入统计与 trace，不返回给发送端。
    pub fn transmit(
        &mut self,
        link: LinkId,
        frame: Frame,
        segment: TraceSegment,
        sim: &mut Simulator,
    ) {
        let frame_bytes = frame.len();
        let Some(l) = self.links.get_mut(link.0) else {
            warn!(link = ?link, "链路不存在，丢弃帧");
            return;
        };
        let outcome = l.send(frame, sim);
        let kind = match outcome {
            SendOutcome::Scheduled { arrive, delay } => TraceEventKind::FrameSent {
                segment,
                arrive_ns: arrive.0,
                serialization_ns: SimTime::from_secs_f64(delay.serialization_s).0,
                propagation_ns: SimTime::from_secs_f64(delay.propagation_s).0,
                jitter_ns: (delay.jitter_s * 1e9).round() as i64,
                duplex_penalty_ns: SimTime::from_secs_f64(delay.duplex_penalty_s).0,
            },
            SendOutcome::Lost => TraceEventKind::FrameLost { segment },
            SendOutcome::Unconnected => TraceEventKind::FrameUnconnected { segment },
        };
        trace!(?outcome, "transmit 完成");
        self.record(sim.now(), Some(link), Some(frame_bytes), kind);
    }

    /// 链路投递：更新链路统计后交给接收端点处理。
    #[tracing::instrument(
        level = "debug",
        skip(self, frame, sim),
        fields(frame_bytes = frame.len())
    )]
    pub fn deliver(&mut self, link: LinkId, to: EndpointId, frame: Frame, sim: &mut Simulator) {
        let frame_bytes = frame.len();
        if let Some(l) = self.links.get_mut(link.0) {
            l.on_delivered(frame_bytes);
        }
        self.record(
            sim.now(),
            Some(link),
            Some(frame_bytes),
            TraceEventKind::FrameDelivered { endpoint: to.0 },
        );

        let handled = self.with_endpoint(to, |ep, net| {
            ep.on_frame_arrival(frame.as_bytes(), sim, net)
        });
        if handled.is_none() {
            warn!(endpoint = ?to, "接收端点不存在，丢弃帧");
        } else {
            debug!("帧已交给端点");
        }
    }
}
