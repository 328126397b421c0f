//! 单角色数据补全
//!
//! 两个相互独立的读取操作（角色会话列表、角色详情），以及把二者
//! 组合成完整 [`CharacterRecord`] 的 [`crawl_character`](CharacterEnricher::crawl_character)。
//! 每次网络调用之后等待固定间隔，以遵守上游限流。

use crate::api::ChatApi;
use crate::error::Result;
use crate::model::{CharacterRecord, CharacterSummary, Conversation};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct CharacterEnricher {
    api: Arc<dyn ChatApi>,
    delay: Duration,
}

impl CharacterEnricher {
    pub fn new(api: Arc<dyn ChatApi>, delay: Duration) -> Self {
        Self { api, delay }
    }

    /// 拉取角色的会话列表并映射为快照格式
    /// （消息数回退链 `message_count` → `num_messages` → 0 在映射中完成）
    pub async fn fetch_conversations(&self, character_id: &str) -> Result<Vec<Conversation>> {
        let raw = self.api.character_conversations(character_id).await?;
        debug!(character_id = %character_id, count = raw.len(), "🔍 角色会话列表");
        Ok(raw.iter().map(Conversation::from).collect())
    }

    /// 拉取角色详情并提取标签（缺失时为空）
    pub async fn fetch_tags(&self, character_id: &str) -> Result<Vec<String>> {
        let details = self.api.character_details(character_id).await?;
        Ok(details.tags)
    }

    /// 完整爬取一个角色：会话列表 → 间隔 → 详情 → 间隔，
    /// 返回含派生字段的完整记录
    pub async fn crawl_character(&self, summary: &CharacterSummary) -> Result<CharacterRecord> {
        let conversations = self.fetch_conversations(&summary.character_id).await?;
        tokio::time::sleep(self.delay).await;

        let tags = self.fetch_tags(&summary.character_id).await?;
        tokio::time::sleep(self.delay).await;

        Ok(CharacterRecord::from_parts(summary, conversations, tags))
    }

    /// 请求间隔（供引擎在自己的调用节奏中复用）
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawConversation;
    use crate::testing::MockChatApi;
    use crate::testing::fixtures::conversation;

    fn summary(character_id: &str) -> CharacterSummary {
        CharacterSummary {
            character_id: character_id.to_string(),
            name: "Alice".to_string(),
            title: "".to_string(),
            avatar_url: "".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_conversations_maps_message_count_fallback() {
        let raw = vec![
            conversation("c1", "x"),
            RawConversation {
                message_count: None,
                num_messages: Some(4),
                ..conversation("c2", "x")
            },
            RawConversation {
                message_count: None,
                num_messages: None,
                ..conversation("c3", "x")
            },
        ];
        let api = Arc::new(MockChatApi::new().with_character("x", raw, Vec::new()));
        let enricher = CharacterEnricher::new(api, Duration::ZERO);

        let conversations = enricher.fetch_conversations("x").await.unwrap();
        let counts: Vec<u32> = conversations.iter().map(|c| c.message_count).collect();
        assert_eq!(counts, vec![1, 4, 0]);
    }

    #[tokio::test]
    async fn test_crawl_character_builds_full_record() {
        let api = Arc::new(MockChatApi::new().with_character(
            "x",
            vec![conversation("c1", "x"), conversation("c2", "x")],
            vec!["fantasy".to_string(), "sci-fi".to_string()],
        ));
        let enricher = CharacterEnricher::new(api.clone(), Duration::ZERO);

        let record = enricher.crawl_character(&summary("x")).await.unwrap();
        assert_eq!(record.character_id, "x");
        assert_eq!(record.name, "Alice");
        assert_eq!(record.total_conversations, 2);
        assert_eq!(record.message_counts, vec![1, 1]);
        assert_eq!(record.tags, vec!["fantasy", "sci-fi"]);

        // 会话列表在前，详情在后
        assert_eq!(api.conversation_calls(), vec!["x"]);
        assert_eq!(api.detail_calls(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_crawl_character_propagates_fetch_failure() {
        let api = Arc::new(MockChatApi::new().with_failing_conversations("x"));
        let enricher = CharacterEnricher::new(api.clone(), Duration::ZERO);

        assert!(enricher.crawl_character(&summary("x")).await.is_err());
        // 会话列表失败后不再请求详情
        assert!(api.detail_calls().is_empty());
    }
}
