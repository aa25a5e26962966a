//! 应用层文本分帧
//!
//! 端点只把消息当作字节；这里负责渲染成
//! `METHOD PATH VERSION\r\nHeader: value\r\n...\r\n\r\n[body]`，
//! 并告诉重组缓冲区一条消息在哪里结束。

mod message;

pub use message::{framed_len, HttpError, HttpRequest, HttpResponse, HTTP_VERSION, MAX_BODY_LEN};

/// 合成响应的 `Server` 头
pub const SERVER_NAME: &str = "netstack-sim";

/// 服务端对 `req` 的应答：GET 返回 `200 OK` 和 `body`，HEAD 只返回头部，
/// 其他方法返回 `405 Method Not Allowed`。
pub fn respond(req: &HttpRequest, body: &str) -> HttpResponse {
    let (status, reason, body) = match req.method.as_str() {
        "GET" => (200, "OK", body.as_bytes().to_vec()),
        "HEAD" => (200, "OK", Vec::new()),
        _ => (405, "Method Not Allowed", Vec::new()),
    };
    let mut resp = HttpResponse::new(status, reason)
        .with_header("Content-Type", "text/html; charset=utf-8")
        .with_header("Server", SERVER_NAME)
        .with_header("Connection", "close");
    if status == 405 {
        resp = resp.with_header("Allow", "GET, HEAD");
    }
    resp.with_body(body)
}
