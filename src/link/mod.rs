//! 物理链路模块
//!
//! 单向链路的介质预设、配置校验、时延/丢帧模型与调度。

mod config;
mod error;
mod medium;
mod simulated_link;

pub use config::{DelayBreakdown, Duplex, LinkConfig, LinkProfile};
pub use error::LinkError;
pub use medium::{Medium, SPEED_OF_LIGHT_MPS};
pub use simulated_link::{LinkStats, SendOutcome, SimulatedLink};
