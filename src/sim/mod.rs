//! 仿真核心模块
//!
//! 事件驱动仿真的时间、事件、世界、仿真器，以及场景配置。

mod event;
mod scenario;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use scenario::{RequestSpec, ScenarioError, ScenarioSpec, SCENARIO_SCHEMA_VERSION};
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
