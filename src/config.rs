//! 运行配置
//!
//! 聚合器没有 CLI 参数：全部配置在启动时从环境变量读取一次
//! （`.env` 文件通过 `dotenv` 自动加载），之后作为不可变值
//! 传入 [`Orchestrator`](crate::orchestrator::Orchestrator)。
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | `ARCHIVER_BASE_URL` | `https://prod.nd-api.com/v2` | 上游 API 根地址 |
//! | `ARCHIVER_TOKEN` | （空） | Bearer 凭证 |
//! | `ARCHIVER_DELAY_MS` | `200` | 每次请求后的固定间隔（毫秒） |
//! | `ARCHIVER_OUTPUT_PATH` | `aggregated.json` | 快照输出文件 |

use crate::error::{ArchiveError, ConfigError, Result};
use dotenv::dotenv;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 每次网络请求后的默认间隔（毫秒）
const DEFAULT_DELAY_MS: u64 = 200;
/// 上游 API 默认根地址
const DEFAULT_BASE_URL: &str = "https://prod.nd-api.com/v2";
/// 默认快照输出文件
const DEFAULT_OUTPUT_PATH: &str = "aggregated.json";

/// 聚合器的不可变运行配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// 上游 API 根地址（不含尾部 `/`）
    pub base_url: String,
    /// Bearer 凭证
    pub auth_token: String,
    /// 每次网络请求后的固定间隔（毫秒）
    pub delay_ms: u64,
    /// 快照输出文件路径
    pub output_path: PathBuf,
}

impl Config {
    /// 从环境变量构建配置（缺省项使用默认值）
    ///
    /// `ARCHIVER_DELAY_MS` 非法时返回 [`ConfigError::InvalidValue`]。
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let base_url =
            std::env::var("ARCHIVER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let auth_token = std::env::var("ARCHIVER_TOKEN").unwrap_or_default();
        let delay_ms = match std::env::var("ARCHIVER_DELAY_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue {
                    field: "ARCHIVER_DELAY_MS".to_string(),
                    message: e.to_string(),
                }
            })?,
            Err(_) => DEFAULT_DELAY_MS,
        };
        let output_path = std::env::var("ARCHIVER_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_PATH));

        Ok(Self {
            base_url,
            auth_token,
            delay_ms,
            output_path,
        })
    }

    /// 请求间隔
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// 组装发往上游 API 的固定请求头（含 Bearer 凭证）
    pub fn assemble_headers(&self) -> Result<HeaderMap> {
        const STATIC_HEADERS: &[(&str, &str)] = &[
            (
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
            ),
            ("Accept", "application/json, text/plain, */*"),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Cache-Control", "no-cache"),
            ("Pragma", "no-cache"),
            ("Referer", "https://spicychat.ai/"),
            ("Origin", "https://spicychat.ai"),
        ];

        let mut header_map = HeaderMap::new();
        header_map.insert(
            "Authorization",
            format!("Bearer {}", self.auth_token)
                .parse()
                .map_err(|e| ArchiveError::Other(format!("Invalid Authorization header: {}", e)))?,
        );
        for (name, value) in STATIC_HEADERS {
            header_map.insert(
                *name,
                value
                    .parse()
                    .map_err(|e| ArchiveError::Other(format!("Invalid {} header: {}", name, e)))?,
            );
        }
        Ok(header_map)
    }
}
