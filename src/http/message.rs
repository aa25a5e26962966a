//! HTTP/1.1 请求/响应的文本编解码

use thiserror::Error;

pub const HTTP_VERSION: &str = "HTTP/1.1";
const HEAD_END: &[u8] = b"\r\n\r\n";

/// 正文长度上限：重组缓冲区只接受距流起点 2^31 以内的字节，更长的正文永远收不全。
pub const MAX_BODY_LEN: usize = 1 << 31;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("message has no blank line ending the header block")]
    MissingTerminator,
    #[error("header block is not valid UTF-8")]
    NotUtf8,
    #[error("malformed start line: {0:?}")]
    BadStartLine(String),
    #[error("malformed header line: {0:?}")]
    BadHeader(String),
    #[error("bad status code: {0:?}")]
    BadStatus(String),
    #[error("Content-Length {0} exceeds the 2^31-byte body limit")]
    BadContentLength(String),
}

/// 头部声明的正文长度
enum BodyLen {
    Declared(usize),
    TooLarge(String),
}

fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(HEAD_END.len()).position(|w| w == HEAD_END)
}

/// 第一个数字形式的 `Content-Length`；非数字的值视为没有。
fn content_length(head: &str) -> Option<BodyLen> {
    head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("content-length") {
            return None;
        }
        let value = value.trim();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(match value.parse::<usize>() {
            Ok(n) if n <= MAX_BODY_LEN => BodyLen::Declared(n),
            _ => BodyLen::TooLarge(value.to_string()),
        })
    })
}

/// `data` 中第一条完整消息的长度：头部到空行，再加 `Content-Length` 字节的正文
/// （缺省或无法解析时为 0）。消息尚不完整时返回 `None`。
///
/// 超出 [`MAX_BODY_LEN`] 的声明长度只按头部分帧，交给解析阶段报错。
pub fn framed_len(data: &[u8]) -> Option<usize> {
    let head_end = find_head_end(data)?;
    let head = String::from_utf8_lossy(&data[..head_end]);
    let body = match content_length(&head) {
        Some(BodyLen::Declared(n)) => n,
        Some(BodyLen::TooLarge(_)) | None => 0,
    };
    let need = (head_end + HEAD_END.len()).checked_add(body)?;
    (data.len() >= need).then_some(need)
}

struct RawMessage<'a> {
    start: (&'a str, &'a str, &'a str),
    headers: Vec<(String, String)>,
    body: &'a [u8],
}

fn parse_raw(data: &[u8]) -> Result<RawMessage<'_>, HttpError> {
    let head_end = find_head_end(data).ok_or(HttpError::MissingTerminator)?;
    let head = std::str::from_utf8(&data[..head_end]).map_err(|_| HttpError::NotUtf8)?;
    let mut lines = head.split("\r\n");
    let start_line = lines.next().unwrap_or_default();
    let mut parts = start_line.splitn(3, ' ');
    let start = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(c)) if !a.is_empty() && !b.is_empty() => (a, b, c),
        _ => return Err(HttpError::BadStartLine(start_line.to_string())),
    };
    let headers = lines
        .map(|line| {
            line.split_once(':')
                .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| HttpError::BadHeader(line.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let body_start = head_end + HEAD_END.len();
    let body_len = match content_length(head) {
        Some(BodyLen::Declared(n)) => n,
        Some(BodyLen::TooLarge(v)) => return Err(HttpError::BadContentLength(v)),
        None => data.len() - body_start,
    };
    let body_end = body_start.saturating_add(body_len).min(data.len());
    Ok(RawMessage {
        start,
        headers,
        body: &data[body_start..body_end],
    })
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn render(start_line: &str, headers: &[(String, String)], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(start_line.len() + body.len() + 64);
    out.extend_from_slice(start_line.as_bytes());
    out.extend_from_slice(b"\r\n");
    for (name, value) in headers {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: HTTP_VERSION.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 设置正文，并同步 `Content-Length` 头。
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case("content-length"));
        self.headers
            .push(("Content-Length".to_string(), self.body.len().to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let start = format!("{} {} {}", self.method, self.path, self.version);
        render(&start, &self.headers, &self.body)
    }

    pub fn parse(data: &[u8]) -> Result<Self, HttpError> {
        let raw = parse_raw(data)?;
        let (method, path, version) = raw.start;
        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
            headers: raw.headers,
            body: raw.body.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            version: HTTP_VERSION.to_string(),
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 设置正文，并同步 `Content-Length` 头。
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case("content-length"));
        self.headers
            .push(("Content-Length".to_string(), self.body.len().to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let start = format!("{} {} {}", self.version, self.status, self.reason);
        render(&start, &self.headers, &self.body)
    }

    pub fn parse(data: &[u8]) -> Result<Self, HttpError> {
        let raw = parse_raw(data)?;
        let (version, status, reason) = raw.start;
        let status = status
            .parse()
            .map_err(|_| HttpError::BadStatus(status.to_string()))?;
        Ok(Self {
            version: version.to_string(),
            status,
            reason: reason.to_string(),
            headers: raw.headers,
            body: raw.body.to_vec(),
        })
    }
}
