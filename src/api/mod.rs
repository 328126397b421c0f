//! 上游 API 访问层
//!
//! [`ChatApi`] 是聚合器与上游 HTTP 之间唯一的边界：
//! collector / enricher / engine 只依赖这个 trait，
//! 测试时可以注入 [`MockChatApi`](crate::testing::MockChatApi) 完全离线运行。

mod client;
pub mod types;

use crate::config::Config;
use crate::error::Result;
use crate::api::types::{RawCharacterDetail, RawConversation};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// 会话列表接口的固定页大小
pub const PAGE_SIZE: usize = 25;
/// 单角色会话列表的拉取上限
pub const CHARACTER_CONVERSATION_LIMIT: usize = 100;

/// 上游 API 的读取能力
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// 拉取一页会话列表；`cursor` 为上一页终止记录的角色 ID（首页为 `None`）
    async fn conversation_page(&self, cursor: Option<&str>) -> Result<Vec<RawConversation>>;

    /// 拉取指定角色的会话列表（上限 100 条）
    async fn character_conversations(&self, character_id: &str) -> Result<Vec<RawConversation>>;

    /// 拉取指定角色的详情记录
    async fn character_details(&self, character_id: &str) -> Result<RawCharacterDetail>;
}

/// 基于 `reqwest` 的默认实现
pub struct HttpChatApi {
    client: Arc<Client>,
    base_url: String,
    headers: HeaderMap,
}

impl HttpChatApi {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Arc::new(Client::new()),
            base_url: config.base_url.clone(),
            headers: config.assemble_headers()?,
        })
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn conversation_page(&self, cursor: Option<&str>) -> Result<Vec<RawConversation>> {
        let mut url = format!("{}/conversations?limit={}", self.base_url, PAGE_SIZE);
        if let Some(last_id) = cursor {
            url.push_str(&format!("&last_id={}", last_id));
        }
        client::get(self.client.clone(), self.headers.clone(), &url).await
    }

    async fn character_conversations(&self, character_id: &str) -> Result<Vec<RawConversation>> {
        let url = format!(
            "{}/characters/{}/conversations?limit={}",
            self.base_url, character_id, CHARACTER_CONVERSATION_LIMIT
        );
        client::get(self.client.clone(), self.headers.clone(), &url).await
    }

    async fn character_details(&self, character_id: &str) -> Result<RawCharacterDetail> {
        let url = format!("{}/characters/{}", self.base_url, character_id);
        client::get(self.client.clone(), self.headers.clone(), &url).await
    }
}
