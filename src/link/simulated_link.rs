//! 仿真链路
//!
//! 状态机：Unconnected -> Connected（单向，connect 时登记接收端并校验配置）。
//! send 只做调度：抽样丢帧与时延，然后在 now + delay 投递一个 `DeliverFrame` 事件。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use super::config::{DelayBreakdown, LinkConfig, LinkProfile};
use super::error::LinkError;
use crate::net::{DeliverFrame, EndpointId, LinkId};
use crate::sim::{SimTime, Simulator};
use crate::wire::Frame;

/// 链路统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub sent_frames: u64,
    pub lost_frames: u64,
    pub unconnected_drops: u64,
    pub delivered_frames: u64,
    pub delivered_bytes: u64,
}

#[derive(Debug)]
enum LinkState {
    Unconnected,
    Connected {
        receiver: EndpointId,
        profile: LinkProfile,
    },
}

/// 一次 send 的结果，只供网络层记录 trace；发送端不感知丢帧。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SendOutcome {
    Scheduled {
        arrive: SimTime,
        delay: DelayBreakdown,
    },
    Lost,
    Unconnected,
}

/// 单向仿真链路
#[derive(Debug)]
pub struct SimulatedLink {
    id: LinkId,
    name: String,
    config: LinkConfig,
    state: LinkState,
    rng: StdRng,
    stats: LinkStats,
}

impl SimulatedLink {
    /// 创建未连接的链路；随机源由调用方显式给出。
    pub fn new(id: LinkId, name: impl Into<String>, config: LinkConfig, rng: StdRng) -> Self {
        Self {
            id,
            name: name.into(),
            config,
            state: LinkState::Unconnected,
            rng,
            stats: LinkStats::default(),
        }
    }

    pub fn with_seed(id: LinkId, name: impl Into<String>, config: LinkConfig, seed: u64) -> Self {
        Self::new(id, name, config, StdRng::seed_from_u64(seed))
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Connected { .. })
    }

    pub fn receiver(&self) -> Option<EndpointId> {
        match self.state {
            LinkState::Connected { receiver, .. } => Some(receiver),
            LinkState::Unconnected => None,
        }
    }

    pub fn profile(&self) -> Option<&LinkProfile> {
        match &self.state {
            LinkState::Connected { profile, .. } => Some(profile),
            LinkState::Unconnected => None,
        }
    }

    /// 登记接收端。配置非法或重复连接时返回错误，链路保持原状态。
    #[tracing::instrument(skip(self), fields(link = %self.name))]
    pub fn connect(&mut self, receiver: EndpointId) -> Result<(), LinkError> {
        if self.is_connected() {
            return Err(LinkError::AlreadyConnected(self.name.clone()));
        }
        let profile = self.config.resolve()?;
        info!(
            medium = %profile.medium,
            rate_bps = profile.rate_bps,
            distance_m = profile.distance_m,
            duplex = ?profile.duplex,
            loss = profile.loss,
            "🔌 链路已连接"
        );
        self.state = LinkState::Connected { receiver, profile };
        Ok(())
    }

    /// 发送一帧。丢帧与未连接都不是错误，只体现在统计与日志里。
    #[tracing::instrument(
        level = "debug",
        skip(self, frame, sim),
        fields(link = %self.name, frame_bytes = frame.len())
    )]
    pub fn send(&mut self, frame: Frame, sim: &mut Simulator) -> SendOutcome {
        let LinkState::Connected { receiver, profile } = &self.state else {
            self.stats.unconnected_drops += 1;
            warn!("链路未连接，丢弃帧");
            return SendOutcome::Unconnected;
        };
        let (receiver, profile) = (*receiver, *profile);
        self.stats.sent_frames += 1;

        let roll: f64 = self.rng.gen_range(0.0..1.0);
        if roll < profile.loss {
            self.stats.lost_frames += 1;
            debug!(roll, loss = profile.loss, "帧在链路上丢失");
            return SendOutcome::Lost;
        }

        let delay = profile.sample_delay(frame.len_bits(), &mut self.rng);
        let arrive = sim.now().saturating_add(delay.total);
        trace!(
            serialization_s = delay.serialization_s,
            propagation_s = delay.propagation_s,
            jitter_s = delay.jitter_s,
            duplex_penalty_s = delay.duplex_penalty_s,
            total = %delay.total,
            "计算时延"
        );
        debug!(arrive = %arrive, to = ?receiver, "调度帧到达事件");

        sim.schedule(
            arrive,
            DeliverFrame {
                link: self.id,
                to: receiver,
                frame,
            },
        );
        SendOutcome::Scheduled { arrive, delay }
    }

    pub(crate) fn on_delivered(&mut self, frame_bytes: usize) {
        self.stats.delivered_frames += 1;
        self.stats.delivered_bytes += frame_bytes as u64;
    }
}
