//! 快照数据模型
//!
//! 输出文件是一个 [`CharacterRecord`] 数组。`message_counts` 与
//! `total_conversations` 是 `conversations` 的冗余派生字段，
//! 统一由 [`CharacterRecord::from_parts`] 计算，避免各处手工维护时走形。

use crate::api::types::RawConversation;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ── Conversation ─────────────────────────────────────────────────────────────

/// 快照中的单条会话
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// 会话唯一 ID
    pub id: String,
    /// 创建时间（上游原样透传）
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// 消息数
    pub message_count: u32,
}

impl From<&RawConversation> for Conversation {
    fn from(raw: &RawConversation) -> Self {
        Self {
            id: raw.id.clone(),
            created_at: raw.created_at.clone(),
            message_count: raw.effective_message_count(),
        }
    }
}

// ── CharacterSummary ──────────────────────────────────────────────────────────

/// 会话列表中发现的角色摘要（完整记录爬取前的种子信息）
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSummary {
    pub character_id: String,
    pub name: String,
    pub title: String,
    pub avatar_url: String,
}

impl CharacterSummary {
    /// 从一条会话记录提取角色摘要；内嵌角色对象缺失时使用默认值
    pub fn from_conversation(raw: &RawConversation) -> Self {
        let character = raw.character.as_ref();
        Self {
            character_id: raw.character_id.clone(),
            name: character
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            title: character.and_then(|c| c.title.clone()).unwrap_or_default(),
            avatar_url: character
                .and_then(|c| c.avatar_url.clone())
                .unwrap_or_default(),
        }
    }
}

/// 按 `character_id` 去重，保持首次出现的顺序
pub fn unique_characters(conversations: &[RawConversation]) -> Vec<CharacterSummary> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut characters = Vec::new();
    for conv in conversations {
        if seen.insert(conv.character_id.as_str()) {
            characters.push(CharacterSummary::from_conversation(conv));
        }
    }
    characters
}

// ── CharacterRecord ───────────────────────────────────────────────────────────

/// 快照中的单个角色记录（输出 schema）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterRecord {
    pub character_id: String,
    pub name: String,
    pub title: String,
    pub avatar_url: String,
    pub tags: Vec<String>,
    pub conversations: Vec<Conversation>,
    /// 派生字段：逐条对应 `conversations[i].message_count`
    pub message_counts: Vec<u32>,
    /// 派生字段：`conversations.len()`
    pub total_conversations: usize,
    /// 该角色本轮抓取失败时的错误信息（成功时不写入文件）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CharacterRecord {
    /// 由角色摘要 + 会话列表 + 标签构建完整记录，派生字段在此统一计算
    pub fn from_parts(
        summary: &CharacterSummary,
        conversations: Vec<Conversation>,
        tags: Vec<String>,
    ) -> Self {
        let message_counts = conversations.iter().map(|c| c.message_count).collect();
        let total_conversations = conversations.len();
        Self {
            character_id: summary.character_id.clone(),
            name: summary.name.clone(),
            title: summary.title.clone(),
            avatar_url: summary.avatar_url.clone(),
            tags,
            conversations,
            message_counts,
            total_conversations,
            error: None,
        }
    }

    /// 抓取失败且无历史记录可回退时的占位记录
    pub fn failed(summary: &CharacterSummary, message: impl Into<String>) -> Self {
        let mut record = Self::from_parts(summary, Vec::new(), Vec::new());
        record.error = Some(message.into());
        record
    }
}

/// 把快照记录列表转为 `character_id` → 记录 的查找表
pub fn index_by_character_id(records: Vec<CharacterRecord>) -> HashMap<String, CharacterRecord> {
    records
        .into_iter()
        .map(|r| (r.character_id.clone(), r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawCharacterSummary;

    fn raw_conv(id: &str, character_id: &str, with_character: bool) -> RawConversation {
        RawConversation {
            id: id.to_string(),
            character_id: character_id.to_string(),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            message_count: Some(5),
            num_messages: None,
            is_last_id: None,
            character: with_character.then(|| RawCharacterSummary {
                name: Some(format!("角色-{}", character_id)),
                title: Some("title".to_string()),
                avatar_url: Some("https://example.test/a.png".to_string()),
            }),
        }
    }

    #[test]
    fn test_unique_characters_first_seen_order() {
        let conversations = vec![
            raw_conv("c1", "b", true),
            raw_conv("c2", "a", true),
            raw_conv("c3", "b", true),
            raw_conv("c4", "a", true),
        ];
        let characters = unique_characters(&conversations);
        let ids: Vec<&str> = characters.iter().map(|c| c.character_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_embedded_character_defaults() {
        let summary = CharacterSummary::from_conversation(&raw_conv("c1", "x", false));
        assert_eq!(summary.name, "Unknown");
        assert_eq!(summary.title, "");
        assert_eq!(summary.avatar_url, "");
    }

    #[test]
    fn test_derived_fields_stay_consistent() {
        let summary = CharacterSummary::from_conversation(&raw_conv("c1", "x", true));
        let conversations: Vec<Conversation> = [("c1", 3u32), ("c2", 0), ("c3", 9)]
            .iter()
            .map(|(id, n)| Conversation {
                id: id.to_string(),
                created_at: None,
                message_count: *n,
            })
            .collect();
        let record = CharacterRecord::from_parts(&summary, conversations, vec!["tag".to_string()]);

        assert_eq!(record.total_conversations, record.conversations.len());
        assert_eq!(record.message_counts.len(), record.conversations.len());
        for (i, conv) in record.conversations.iter().enumerate() {
            assert_eq!(record.message_counts[i], conv.message_count);
        }
        assert!(record.error.is_none());
    }

    #[test]
    fn test_failed_record_is_empty_placeholder() {
        let summary = CharacterSummary::from_conversation(&raw_conv("c1", "x", true));
        let record = CharacterRecord::failed(&summary, "Network error: boom");

        assert_eq!(record.total_conversations, 0);
        assert!(record.conversations.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.error.as_deref(), Some("Network error: boom"));
    }

    #[test]
    fn test_error_field_omitted_when_absent() {
        let summary = CharacterSummary::from_conversation(&raw_conv("c1", "x", true));
        let record = CharacterRecord::from_parts(&summary, Vec::new(), Vec::new());
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"error\""));

        let failed = CharacterRecord::failed(&summary, "boom");
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"error\":\"boom\""));
    }
}
