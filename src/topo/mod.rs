//! 拓扑构建

pub mod point_to_point;
