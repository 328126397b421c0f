//! Mock 上游 API，用于在不发起真实 HTTP 请求的情况下测试
//! collector / enricher / engine / orchestrator。
//!
//! 按 [`MockChatApi`] 的 `with_*` 方法脚本化各端点的返回值；
//! 所有调用（含分页游标参数）都被记录，可在断言中检查。

use crate::api::ChatApi;
use crate::api::types::{RawCharacterDetail, RawConversation};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// 可脚本化的 Mock 上游 API。
///
/// - `conversation_page` 按 [`with_page`](Self::with_page) 的顺序出队，
///   队列耗尽后返回空页（对 collector 而言即自然终止）。
/// - `character_conversations` / `character_details` 按角色 ID 返回
///   [`with_character`](Self::with_character) 预设的数据，未预设的角色返回空值。
/// - [`with_failing_conversations`](Self::with_failing_conversations) /
///   [`with_failing_details`](Self::with_failing_details) 注入网络错误。
pub struct MockChatApi {
    pages: Mutex<VecDeque<Vec<RawConversation>>>,
    conversations: Mutex<HashMap<String, Vec<RawConversation>>>,
    details: Mutex<HashMap<String, RawCharacterDetail>>,
    failing_conversations: Mutex<HashSet<String>>,
    failing_details: Mutex<HashSet<String>>,
    /// 每次 `conversation_page` 调用收到的游标，按顺序记录
    page_cursors: Mutex<Vec<Option<String>>>,
    conversation_calls: Mutex<Vec<String>>,
    detail_calls: Mutex<Vec<String>>,
}

impl Default for MockChatApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatApi {
    /// 创建空 Mock，尚未脚本化任何响应
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            conversations: Mutex::new(HashMap::new()),
            details: Mutex::new(HashMap::new()),
            failing_conversations: Mutex::new(HashSet::new()),
            failing_details: Mutex::new(HashSet::new()),
            page_cursors: Mutex::new(Vec::new()),
            conversation_calls: Mutex::new(Vec::new()),
            detail_calls: Mutex::new(Vec::new()),
        }
    }

    /// 追加一页会话列表响应
    pub fn with_page(self, page: Vec<RawConversation>) -> Self {
        self.pages.lock().unwrap().push_back(page);
        self
    }

    /// 预设一个角色的会话列表与标签
    pub fn with_character(
        self,
        character_id: impl Into<String>,
        conversations: Vec<RawConversation>,
        tags: Vec<String>,
    ) -> Self {
        let character_id = character_id.into();
        self.conversations
            .lock()
            .unwrap()
            .insert(character_id.clone(), conversations);
        self.details
            .lock()
            .unwrap()
            .insert(character_id, RawCharacterDetail { tags });
        self
    }

    /// 让指定角色的会话列表请求返回网络错误
    pub fn with_failing_conversations(self, character_id: impl Into<String>) -> Self {
        self.failing_conversations
            .lock()
            .unwrap()
            .insert(character_id.into());
        self
    }

    /// 让指定角色的详情请求返回网络错误
    pub fn with_failing_details(self, character_id: impl Into<String>) -> Self {
        self.failing_details
            .lock()
            .unwrap()
            .insert(character_id.into());
        self
    }

    /// 分页接口收到的游标序列
    pub fn page_cursors(&self) -> Vec<Option<String>> {
        self.page_cursors.lock().unwrap().clone()
    }

    /// 分页接口的调用次数
    pub fn page_call_count(&self) -> usize {
        self.page_cursors.lock().unwrap().len()
    }

    /// 角色会话列表接口收到的角色 ID 序列
    pub fn conversation_calls(&self) -> Vec<String> {
        self.conversation_calls.lock().unwrap().clone()
    }

    /// 角色详情接口收到的角色 ID 序列
    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn conversation_page(&self, cursor: Option<&str>) -> Result<Vec<RawConversation>> {
        self.page_cursors
            .lock()
            .unwrap()
            .push(cursor.map(String::from));
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn character_conversations(&self, character_id: &str) -> Result<Vec<RawConversation>> {
        self.conversation_calls
            .lock()
            .unwrap()
            .push(character_id.to_string());
        if self
            .failing_conversations
            .lock()
            .unwrap()
            .contains(character_id)
        {
            return Err(ApiError::NetworkError("mock connection refused".to_string()).into());
        }
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .get(character_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn character_details(&self, character_id: &str) -> Result<RawCharacterDetail> {
        self.detail_calls
            .lock()
            .unwrap()
            .push(character_id.to_string());
        if self.failing_details.lock().unwrap().contains(character_id) {
            return Err(ApiError::NetworkError("mock connection refused".to_string()).into());
        }
        Ok(self
            .details
            .lock()
            .unwrap()
            .get(character_id)
            .cloned()
            .unwrap_or_default())
    }
}
