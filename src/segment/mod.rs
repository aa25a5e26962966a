//! 分段与重组
//!
//! 发送端按 MSS 切分字节流；接收端按序号把分段拼回字节流，并判断消息是否完整。

mod reassembly;
mod split;

pub use reassembly::ReassemblyBuffer;
pub use split::{segment_count, split};
