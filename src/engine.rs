//! 增量同步引擎（核心）
//!
//! 对每个本轮发现的角色，与已存快照比对后执行三种动作之一：
//!
//! | 已存记录 | 动作 | 条件 |
//! |----------|------|------|
//! | 不存在 | 全量爬取 | 总是 |
//! | 存在 | 跳过 | 新旧会话 ID 集合相同（基数相等且每个新 ID 都在旧集合中） |
//! | 存在 | 更新 | 集合不同（数量变化或出现新 ID） |
//!
//! 集合比较与顺序无关：会话在响应里的排列变化不会触发更新。
//!
//! 单个角色的任何抓取失败只影响该角色：有旧记录则原样回退，
//! 否则写入带错误信息的占位记录，随后继续处理剩余角色。

use crate::api::ChatApi;
use crate::enricher::CharacterEnricher;
use crate::model::{CharacterRecord, CharacterSummary, Conversation};
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// ── 分类规则 ──────────────────────────────────────────────────────────────────

/// 跳过判定：两份会话列表的 ID 集合是否相同。
/// 基数相等且每个新 ID 都在旧集合中（对称集合相等，与顺序无关）。
pub fn same_id_set(stored: &[Conversation], fresh: &[Conversation]) -> bool {
    let stored_ids: HashSet<&str> = stored.iter().map(|c| c.id.as_str()).collect();
    let fresh_ids: HashSet<&str> = fresh.iter().map(|c| c.id.as_str()).collect();
    fresh_ids.len() == stored_ids.len() && fresh_ids.iter().all(|id| stored_ids.contains(id))
}

// ── 运行统计 ──────────────────────────────────────────────────────────────────

/// 一轮增量同步的分类计数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// 新增角色数（仅增量运行时计数）
    pub added: usize,
    /// 会话集合变化而重建的角色数
    pub updated: usize,
    /// 原样复用旧记录的角色数
    pub skipped: usize,
}

/// 一轮同步的完整产出
pub struct ReconcileOutcome {
    /// 下一份快照，按角色首次发现顺序排列
    pub records: Vec<CharacterRecord>,
    pub stats: RunStats,
    /// 本轮是否为增量运行（处理开始前已存快照非空）
    pub incremental: bool,
}

// ── ReconciliationEngine ──────────────────────────────────────────────────────

pub struct ReconciliationEngine {
    enricher: CharacterEnricher,
}

impl ReconciliationEngine {
    pub fn new(api: Arc<dyn ChatApi>, delay: Duration) -> Self {
        Self {
            enricher: CharacterEnricher::new(api, delay),
        }
    }

    /// 按发现顺序逐个处理角色，产出下一份快照与分类计数。
    ///
    /// 增量标志在处理任何角色之前一次性确定，只影响日志与统计，
    /// 不参与每个角色的动作判定。
    pub async fn reconcile(
        &self,
        characters: &[CharacterSummary],
        stored: &HashMap<String, CharacterRecord>,
    ) -> ReconcileOutcome {
        let incremental = !stored.is_empty();
        let mut stats = RunStats::default();
        let mut records = Vec::with_capacity(characters.len());
        let total = characters.len();

        for (i, character) in characters.iter().enumerate() {
            let label = format!("({}/{})", i + 1, total);

            match stored.get(&character.character_id) {
                None => {
                    // 新角色在爬取前即计数：爬取失败也算本轮新增（占位记录照常写入）
                    if incremental {
                        info!("✨ {} 新角色 \"{}\"，全量爬取", label, character.name);
                        stats.added += 1;
                    } else {
                        info!("{} 处理 \"{}\"", label, character.name);
                    }
                    match self.enricher.crawl_character(character).await {
                        Ok(record) => records.push(record),
                        Err(e) => {
                            error!("❌ {} \"{}\" 抓取失败: {}", label, character.name, e);
                            records.push(CharacterRecord::failed(character, e.to_string()));
                        }
                    }
                }
                Some(existing) => match self.refresh_existing(character, existing).await {
                    Ok(None) => {
                        info!(
                            "⏭ {} 跳过 \"{}\"（{} 条会话，无变化）",
                            label,
                            character.name,
                            existing.total_conversations
                        );
                        records.push(existing.clone());
                        stats.skipped += 1;
                    }
                    Ok(Some(rebuilt)) => {
                        info!(
                            "🔄 {} 更新 \"{}\"（{} → {} 条会话）",
                            label,
                            character.name,
                            existing.total_conversations,
                            rebuilt.total_conversations
                        );
                        records.push(rebuilt);
                        stats.updated += 1;
                    }
                    Err(e) => {
                        error!(
                            "❌ {} \"{}\" 抓取失败，回退旧记录: {}",
                            label, character.name, e
                        );
                        records.push(existing.clone());
                    }
                },
            }
        }

        ReconcileOutcome {
            records,
            stats,
            incremental,
        }
    }

    /// 已有记录的角色：先拉新会话列表比对，集合相同返回 `None`（跳过），
    /// 否则补拉详情并重建记录
    async fn refresh_existing(
        &self,
        character: &CharacterSummary,
        existing: &CharacterRecord,
    ) -> Result<Option<CharacterRecord>> {
        let fresh = self
            .enricher
            .fetch_conversations(&character.character_id)
            .await?;
        tokio::time::sleep(self.enricher.delay()).await;

        if same_id_set(&existing.conversations, &fresh) {
            return Ok(None);
        }

        let tags = self.enricher.fetch_tags(&character.character_id).await?;
        tokio::time::sleep(self.enricher.delay()).await;

        Ok(Some(CharacterRecord::from_parts(character, fresh, tags)))
    }
}
