//! 全量会话收集（分页驱动）
//!
//! 上游的分页游标不在响应元数据里，而是藏在页内某条被 `is_last_id`
//! 标记的记录中：该记录的 `character_id` 就是下一页的 `last_id` 参数。
//! 因此游标提取（[`extract_next_cursor`]）与页长启发式终止是两条
//! 相互独立的规则，分别可测。
//!
//! 每次翻页前等待固定间隔（首页除外），以遵守上游限流。

use crate::api::{ChatApi, PAGE_SIZE};
use crate::api::types::RawConversation;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 从一页记录中提取下一页游标：找到被标记为终止记录的那一条，
/// 取其 `character_id`；无标记记录则视为没有下一页
pub fn extract_next_cursor(page: &[RawConversation]) -> Option<String> {
    page.iter()
        .find(|c| c.is_last_id == Some(true))
        .map(|c| c.character_id.clone())
}

/// 驱动 [`ChatApi::conversation_page`] 翻完所有页，返回扁平化的全量会话列表
pub struct ConversationCollector {
    api: Arc<dyn ChatApi>,
    delay: Duration,
}

impl ConversationCollector {
    pub fn new(api: Arc<dyn ChatApi>, delay: Duration) -> Self {
        Self { api, delay }
    }

    /// 逐页拉取直至终止。终止条件按顺序判断：
    ///
    /// 1. 空页 → 停止；
    /// 2. 页内无终止标记记录 → 停止（视为没有下一页游标）；
    /// 3. 页长不足 [`PAGE_SIZE`] → 保留本页内容后停止。
    pub async fn collect_all(&self) -> Result<Vec<RawConversation>> {
        let mut all: Vec<RawConversation> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_no = 1u32;

        loop {
            debug!(page = page_no, cursor = ?cursor, "📥 拉取会话列表页");
            let page = self.api.conversation_page(cursor.as_deref()).await?;

            if page.is_empty() {
                break;
            }

            let next_cursor = extract_next_cursor(&page);
            let short_page = page.len() < PAGE_SIZE;
            all.extend(page);

            match next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
            if short_page {
                break;
            }

            page_no += 1;
            tokio::time::sleep(self.delay).await;
        }

        info!(total = all.len(), pages = page_no, "📥 会话列表拉取完成");
        Ok(all)
    }
}
