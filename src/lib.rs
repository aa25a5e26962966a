pub mod http;
pub mod link;
pub mod net;
pub mod segment;
pub mod sim;
pub mod topo;
pub mod trace;
pub mod wire;

#[cfg(test)]
mod test;
