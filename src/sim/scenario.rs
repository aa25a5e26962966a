//! 场景配置（JSON）
//!
//! 一个场景描述一次完整的请求/响应交换：两个端点、两个方向的链路、请求内容和随机种子。
//! 除 `schema_version` 外所有字段都有默认值。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::http::HttpRequest;
use crate::link::{LinkConfig, LinkError};
use crate::net::{EndpointConfig, EndpointError};

pub const SCENARIO_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema_version {0} (expected 1)")]
    UnsupportedSchema(u32),
    #[error("endpoint {name}: {source}")]
    Endpoint {
        name: String,
        #[source]
        source: EndpointError,
    },
    #[error("link {name}: {source}")]
    Link {
        name: String,
        #[source]
        source: LinkError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default = "default_client")]
    pub client: EndpointConfig,
    #[serde(default = "default_server")]
    pub server: EndpointConfig,
    /// client -> server
    #[serde(default)]
    pub uplink: LinkConfig,
    /// server -> client
    #[serde(default)]
    pub downlink: LinkConfig,
    #[serde(default)]
    pub request: RequestSpec,
    #[serde(default)]
    pub seed: u64,
    /// 客户端发出请求的时刻（毫秒）
    #[serde(default)]
    pub start_ms: u64,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self {
            schema_version: SCENARIO_SCHEMA_VERSION,
            client: default_client(),
            server: default_server(),
            uplink: LinkConfig::default(),
            downlink: LinkConfig::default(),
            request: RequestSpec::default(),
            seed: 0,
            start_ms: 0,
        }
    }
}

fn default_client() -> EndpointConfig {
    EndpointConfig {
        name: "client".to_string(),
        addr: "10.0.0.2".to_string(),
        port: 53_000,
        ..EndpointConfig::default()
    }
}

fn default_server() -> EndpointConfig {
    EndpointConfig {
        name: "server".to_string(),
        addr: "104.18.32.47".to_string(),
        port: 443,
        initial_ip_id: 0x2000,
        ..EndpointConfig::default()
    }
}

impl ScenarioSpec {
    pub fn from_json_str(s: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(s)?;
        if spec.schema_version != SCENARIO_SCHEMA_VERSION {
            return Err(ScenarioError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// 客户端请求的字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSpec {
    pub method: String,
    pub path: String,
    /// 写入 `Host` 头
    pub authority: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Default for RequestSpec {
    fn default() -> Self {
        let headers = [
            ("Accept", "text/html"),
            ("User-Agent", "netstack-sim/0.1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            method: "GET".to_string(),
            path: "/".to_string(),
            authority: "example.com".to_string(),
            headers,
            body: String::new(),
        }
    }
}

impl RequestSpec {
    pub fn to_request(&self) -> HttpRequest {
        let mut req =
            HttpRequest::new(&self.method, &self.path).with_header("Host", &self.authority);
        for (name, value) in &self.headers {
            req = req.with_header(name, value);
        }
        if !self.body.is_empty() {
            req = req.with_body(self.body.as_bytes());
        }
        req
    }
}
