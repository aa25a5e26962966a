//! 端点自有的计数器
//!
//! 序号与 IP 标识都是端点实例的状态，不存在全局计数器。

/// 传输层序号计数器（u32，回绕）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqCounter {
    isn: u32,
    next: u32,
}

impl SeqCounter {
    pub fn new(isn: u32) -> Self {
        Self { isn, next: isn }
    }

    pub fn isn(&self) -> u32 {
        self.isn
    }

    /// 下一个待发送字节的序号
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// 为长度为 `len` 的分段取序号，并前移计数器。
    pub fn take(&mut self, len: usize) -> u32 {
        let seq = self.next;
        self.next = self.next.wrapping_add(len as u32);
        seq
    }

    /// 开启新的序号空间（回到 ISN）
    pub fn restart(&mut self) {
        self.next = self.isn;
    }
}

/// 网络层标识计数器（u16，回绕）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdCounter {
    next: u16,
}

impl IdCounter {
    pub fn new(start: u16) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u16 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}
