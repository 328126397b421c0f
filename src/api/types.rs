//! 上游 API 的原始响应类型
//!
//! 字段全部按宽松方式反序列化（缺失即 `None` / 默认值），
//! 上游 schema 的小幅变动不会导致整页解析失败。

use serde::{Deserialize, Serialize};

/// `/conversations` 与 `/characters/{id}/conversations` 返回的单条会话记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConversation {
    /// 会话唯一 ID
    pub id: String,
    /// 所属角色 ID
    pub character_id: String,
    /// 创建时间（上游原样透传）
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// 消息数（部分接口用 `num_messages` 字段，见 [`effective_message_count`](Self::effective_message_count)）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_messages: Option<u32>,
    /// 分页终止标记：为 `true` 的记录是逻辑集合的最后一条，
    /// 其 `character_id` 即下一页游标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_last_id: Option<bool>,
    /// 内嵌的角色摘要（可能缺失）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<RawCharacterSummary>,
}

impl RawConversation {
    /// 消息数回退链：`message_count` → `num_messages` → 0
    pub fn effective_message_count(&self) -> u32 {
        self.message_count.or(self.num_messages).unwrap_or(0)
    }
}

/// 会话记录中内嵌的角色摘要
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCharacterSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// `/characters/{id}` 返回的角色详情（只关心 `tags`）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCharacterDetail {
    #[serde(default)]
    pub tags: Vec<String>,
}
