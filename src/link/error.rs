//! 链路配置错误
//!
//! 只在 connect 时产生；运行期的丢帧不是错误。

use thiserror::Error;

use super::medium::Medium;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error(
        "unsupported medium {0:?} (expected one of twisted-pair, fiber, coax, wireless, \
         arcnet, token-ring, localtalk)"
    )]
    UnsupportedMedium(String),
    #[error("medium {0} has no default rate; rate_bps must be given")]
    MissingRate(Medium),
    #[error("rate must be a positive number of bits per second, got {0}")]
    InvalidRate(f64),
    #[error("distance must be a non-negative number of meters, got {0}")]
    InvalidDistance(f64),
    #[error("base latency must be non-negative, got {0} ms")]
    InvalidLatency(f64),
    #[error("jitter bound must be non-negative, got {0} ms")]
    InvalidJitter(f64),
    #[error("loss probability must be within [0, 1], got {0}")]
    InvalidLoss(f64),
    #[error("link {0} is already connected")]
    AlreadyConnected(String),
    #[error("no link with index {0}")]
    UnknownLink(usize),
}
