//! 物理介质预设
//!
//! 每种介质固定一个信号传播速度；历史介质（ARCNET、令牌环、LocalTalk）另带默认速率。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::LinkError;

/// 真空光速（m/s）
pub const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medium {
    #[serde(rename = "twisted-pair")]
    TwistedPair,
    #[serde(rename = "fiber")]
    Fiber,
    #[serde(rename = "coax")]
    Coax,
    #[serde(rename = "wireless")]
    Wireless,
    #[serde(rename = "arcnet")]
    Arcnet,
    #[serde(rename = "token-ring")]
    TokenRing,
    #[serde(rename = "localtalk")]
    LocalTalk,
}

impl Medium {
    pub const ALL: [Medium; 7] = [
        Medium::TwistedPair,
        Medium::Fiber,
        Medium::Coax,
        Medium::Wireless,
        Medium::Arcnet,
        Medium::TokenRing,
        Medium::LocalTalk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Medium::TwistedPair => "twisted-pair",
            Medium::Fiber => "fiber",
            Medium::Coax => "coax",
            Medium::Wireless => "wireless",
            Medium::Arcnet => "arcnet",
            Medium::TokenRing => "token-ring",
            Medium::LocalTalk => "localtalk",
        }
    }

    /// 传播速度占光速的比例（velocity factor）
    pub fn velocity_factor(self) -> f64 {
        match self {
            Medium::TwistedPair => 0.64,
            Medium::Fiber => 0.68,
            Medium::Coax => 0.77,
            Medium::Wireless => 1.0,
            Medium::Arcnet => 0.84,
            Medium::TokenRing => 0.78,
            Medium::LocalTalk => 0.60,
        }
    }

    /// 信号传播速度（m/s）
    pub fn propagation_velocity(self) -> f64 {
        SPEED_OF_LIGHT_MPS * self.velocity_factor()
    }

    /// 历史介质的标称速率（bit/s）；现代介质必须显式给出速率。
    pub fn legacy_rate_bps(self) -> Option<f64> {
        match self {
            Medium::Arcnet => Some(2_500_000.0),
            Medium::TokenRing => Some(16_000_000.0),
            Medium::LocalTalk => Some(230_400.0),
            _ => None,
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Medium {
    type Err = LinkError;

    /// 大小写不敏感，`_` 与 `-` 等价（例如 `Token_Ring`）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        Medium::ALL
            .into_iter()
            .find(|m| m.name() == norm)
            .ok_or_else(|| LinkError::UnsupportedMedium(s.to_string()))
    }
}
