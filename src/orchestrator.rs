//! 运行编排
//!
//! 一轮完整运行：全量拉取会话列表 → 按首次出现顺序去重出角色列表 →
//! 加载已有快照 → 逐个角色增量同步（串行） → 整体覆盖写出新快照 →
//! 输出汇总统计。

use crate::api::{ChatApi, HttpChatApi};
use crate::collector::ConversationCollector;
use crate::config::Config;
use crate::engine::{ReconciliationEngine, RunStats};
use crate::error::Result;
use crate::model::unique_characters;
use crate::store::SnapshotStore;
use std::sync::Arc;
use tracing::info;

/// 一轮运行的汇总统计
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 输出快照中的角色总数
    pub total_characters: usize,
    /// 所有角色的会话总数
    pub total_conversations: usize,
    /// 所有会话的消息总数
    pub total_messages: u64,
    /// 增量分类计数；全量运行（无已存快照）时为 `None`
    pub stats: Option<RunStats>,
}

pub struct Orchestrator {
    config: Config,
    api: Arc<dyn ChatApi>,
}

impl Orchestrator {
    /// 基于 HTTP 上游构建
    pub fn new(config: Config) -> Result<Self> {
        let api: Arc<dyn ChatApi> = Arc::new(HttpChatApi::new(&config)?);
        Ok(Self::with_api(config, api))
    }

    /// 注入任意上游实现（测试用）
    pub fn with_api(config: Config, api: Arc<dyn ChatApi>) -> Self {
        Self { config, api }
    }

    /// 执行一轮完整的聚合运行
    pub async fn run(&self) -> Result<RunSummary> {
        info!("🚀 聚合开始");
        let delay = self.config.delay();

        let collector = ConversationCollector::new(self.api.clone(), delay);
        let all_conversations = collector.collect_all().await?;

        let characters = unique_characters(&all_conversations);
        info!(characters = characters.len(), "共发现唯一角色");

        let store = SnapshotStore::new(&self.config.output_path);
        let stored = store.load();

        let engine = ReconciliationEngine::new(self.api.clone(), delay);
        let outcome = engine.reconcile(&characters, &stored).await;

        store.save(&outcome.records).await?;

        let summary = RunSummary {
            total_characters: outcome.records.len(),
            total_conversations: outcome
                .records
                .iter()
                .map(|r| r.total_conversations)
                .sum(),
            total_messages: outcome
                .records
                .iter()
                .flat_map(|r| r.message_counts.iter())
                .map(|&n| u64::from(n))
                .sum(),
            stats: outcome.incremental.then(|| outcome.stats.clone()),
        };

        info!(
            path = %self.config.output_path.display(),
            "✅ 完成，快照已写出"
        );
        info!(
            characters = summary.total_characters,
            conversations = summary.total_conversations,
            messages = summary.total_messages,
            "汇总"
        );
        if let Some(stats) = &summary.stats {
            info!(
                added = stats.added,
                updated = stats.updated,
                skipped = stats.skipped,
                "增量明细"
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChatApi;
    use crate::testing::fixtures::{conversation, conversation_with_character};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_config() -> Config {
        let path: PathBuf = std::env::temp_dir().join(format!(
            "chat_archiver_orchestrator_test_{}_{}.json",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
        ));
        Config {
            base_url: "https://example.test/v2".to_string(),
            auth_token: "".to_string(),
            delay_ms: 0,
            output_path: path,
        }
    }

    /// 两个角色、三条会话的上游脚本（首页即短页）
    fn scripted_api() -> MockChatApi {
        MockChatApi::new()
            .with_page(vec![
                conversation_with_character("c1", "a", "Alice"),
                conversation_with_character("c2", "b", "Bob"),
                conversation_with_character("c3", "a", "Alice"),
            ])
            .with_character(
                "a",
                vec![conversation("c1", "a"), conversation("c3", "a")],
                vec!["fantasy".to_string()],
            )
            .with_character("b", vec![conversation("c2", "b")], Vec::new())
    }

    #[tokio::test]
    async fn test_first_run_writes_snapshot_without_incremental_stats() {
        let config = temp_config();
        let orchestrator = Orchestrator::with_api(config.clone(), Arc::new(scripted_api()));

        let summary = orchestrator.run().await.unwrap();

        // 全量运行不输出增量明细
        assert!(summary.stats.is_none());
        assert_eq!(summary.total_characters, 2);
        assert_eq!(summary.total_conversations, 3);
        assert_eq!(summary.total_messages, 3);

        let raw = std::fs::read_to_string(&config.output_path).unwrap();
        let records: Vec<crate::model::CharacterRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].character_id, "a");
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[1].character_id, "b");
        std::fs::remove_file(&config.output_path).ok();
    }

    #[tokio::test]
    async fn test_second_run_with_unchanged_upstream_skips_all() {
        let config = temp_config();

        let first = Orchestrator::with_api(config.clone(), Arc::new(scripted_api()))
            .run()
            .await
            .unwrap();
        assert!(first.stats.is_none());
        let snapshot_after_first = std::fs::read_to_string(&config.output_path).unwrap();

        let second = Orchestrator::with_api(config.clone(), Arc::new(scripted_api()))
            .run()
            .await
            .unwrap();

        let stats = second.stats.expect("第二轮应为增量运行");
        assert_eq!(stats.added, 0);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.skipped, 2);

        // 快照内容逐字节不变
        let snapshot_after_second = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(snapshot_after_second, snapshot_after_first);
        std::fs::remove_file(&config.output_path).ok();
    }

    #[tokio::test]
    async fn test_collection_failure_is_fatal() {
        // 首页拉取即失败：属于顶层错误，整轮终止且不写快照
        struct FailingApi;

        #[async_trait::async_trait]
        impl ChatApi for FailingApi {
            async fn conversation_page(
                &self,
                _cursor: Option<&str>,
            ) -> Result<Vec<crate::api::types::RawConversation>> {
                Err(crate::error::ApiError::NetworkError("boom".to_string()).into())
            }
            async fn character_conversations(
                &self,
                _character_id: &str,
            ) -> Result<Vec<crate::api::types::RawConversation>> {
                unreachable!()
            }
            async fn character_details(
                &self,
                _character_id: &str,
            ) -> Result<crate::api::types::RawCharacterDetail> {
                unreachable!()
            }
        }

        let config = temp_config();
        let result = Orchestrator::with_api(config.clone(), Arc::new(FailingApi))
            .run()
            .await;

        assert!(result.is_err());
        // 初始收集失败属于顶层错误，不应写出快照
        assert!(!config.output_path.exists());
    }
}
