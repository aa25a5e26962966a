//! 链路配置与时延模型
//!
//! `LinkConfig` 是外部给定的原始配置（可从 JSON 反序列化）；
//! connect 时校验为 `LinkProfile`，之后只读。

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::LinkError;
use super::medium::Medium;
use crate::sim::SimTime;

/// 双工模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duplex {
    #[default]
    Full,
    /// 共享介质：每帧额外抽样一个等待介质空闲的时延
    Half,
}

/// 单向链路的原始配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// 介质名称，例如 `twisted-pair`、`fiber`、`localtalk`
    pub medium: String,
    /// 标称速率（bit/s）；历史介质缺省时取预设值
    pub rate_bps: Option<f64>,
    /// 物理距离（米）
    pub distance_m: f64,
    pub duplex: Duplex,
    /// 固定基础时延（毫秒）
    pub base_latency_ms: f64,
    /// 抖动上界（毫秒），每帧在 [-jitter, +jitter] 内均匀抽样
    pub jitter_ms: f64,
    /// 丢帧概率 [0, 1]
    pub loss: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            medium: Medium::TwistedPair.name().to_string(),
            rate_bps: Some(100_000_000.0),
            distance_m: 100.0,
            duplex: Duplex::Full,
            base_latency_ms: 0.5,
            jitter_ms: 0.0,
            loss: 0.0,
        }
    }
}

impl LinkConfig {
    /// 校验配置并解析出介质、速率等运行参数。
    pub fn resolve(&self) -> Result<LinkProfile, LinkError> {
        let medium: Medium = self.medium.parse()?;
        let rate_bps = match self.rate_bps {
            Some(r) => r,
            None => medium.legacy_rate_bps().ok_or(LinkError::MissingRate(medium))?,
        };
        if !(rate_bps.is_finite() && rate_bps > 0.0) {
            return Err(LinkError::InvalidRate(rate_bps));
        }
        if !(self.distance_m.is_finite() && self.distance_m >= 0.0) {
            return Err(LinkError::InvalidDistance(self.distance_m));
        }
        if !(self.base_latency_ms.is_finite() && self.base_latency_ms >= 0.0) {
            return Err(LinkError::InvalidLatency(self.base_latency_ms));
        }
        if !(self.jitter_ms.is_finite() && self.jitter_ms >= 0.0) {
            return Err(LinkError::InvalidJitter(self.jitter_ms));
        }
        if !(0.0..=1.0).contains(&self.loss) {
            return Err(LinkError::InvalidLoss(self.loss));
        }

        Ok(LinkProfile {
            medium,
            rate_bps,
            velocity_mps: medium.propagation_velocity(),
            distance_m: self.distance_m,
            duplex: self.duplex,
            base_latency_s: self.base_latency_ms / 1e3,
            jitter_s: self.jitter_ms / 1e3,
            loss: self.loss,
        })
    }
}

/// 校验后的链路参数（时间统一用秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkProfile {
    pub medium: Medium,
    pub rate_bps: f64,
    pub velocity_mps: f64,
    pub distance_m: f64,
    pub duplex: Duplex,
    pub base_latency_s: f64,
    pub jitter_s: f64,
    pub loss: f64,
}

/// 一帧时延的各组成部分（秒）及其合计。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayBreakdown {
    pub base_s: f64,
    pub serialization_s: f64,
    pub propagation_s: f64,
    pub jitter_s: f64,
    pub duplex_penalty_s: f64,
    pub total: SimTime,
}

impl LinkProfile {
    /// 串行化时延：bits / rate
    pub fn serialization_delay_s(&self, bits: u64) -> f64 {
        bits as f64 / self.rate_bps
    }

    /// 传播时延：distance / velocity
    pub fn propagation_delay_s(&self) -> f64 {
        self.distance_m / self.velocity_mps
    }

    /// 不含随机项的时延：基础 + 串行化 + 传播
    pub fn fixed_delay(&self, bits: u64) -> SimTime {
        SimTime::from_secs_f64(
            self.base_latency_s + self.serialization_delay_s(bits) + self.propagation_delay_s(),
        )
    }

    /// 抽样一帧的完整时延。合计为负时截断为 0。
    pub fn sample_delay<R: Rng + ?Sized>(&self, bits: u64, rng: &mut R) -> DelayBreakdown {
        let serialization_s = self.serialization_delay_s(bits);
        let propagation_s = self.propagation_delay_s();
        let jitter_s = if self.jitter_s > 0.0 {
            rng.gen_range(-self.jitter_s..=self.jitter_s)
        } else {
            0.0
        };
        let duplex_penalty_s = match self.duplex {
            Duplex::Half if serialization_s > 0.0 => rng.gen_range(0.0..serialization_s),
            _ => 0.0,
        };
        let sum =
            self.base_latency_s + serialization_s + propagation_s + jitter_s + duplex_penalty_s;
        DelayBreakdown {
            base_s: self.base_latency_s,
            serialization_s,
            propagation_s,
            jitter_s,
            duplex_penalty_s,
            total: SimTime::from_secs_f64(sum.max(0.0)),
        }
    }
}
