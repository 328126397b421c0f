//! 快照持久化
//!
//! 输出文件是一个美化缩进的 JSON 数组（[`CharacterRecord`] 按发现顺序排列），
//! 每轮运行整体覆盖写入。
//!
//! 加载策略是容忍降级：文件缺失 → 全量模式（空表）；文件无法读取或解析 →
//! 打一条 warning 后同样按空表处理。文件随后必然被整体重写，
//! 不存在静默损坏的风险。

use crate::error::{Result, StoreError};
use crate::model::{CharacterRecord, index_by_character_id};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 加载已有快照为 `character_id` → 记录 的查找表。
    ///
    /// 返回空表即「全量模式」；任何读取/解析失败都降级为空表。
    pub fn load(&self) -> HashMap<String, CharacterRecord> {
        if !self.path.exists() {
            return HashMap::new();
        }
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), "快照文件读取失败，按空快照继续: {e}");
                return HashMap::new();
            }
        };
        let records: Vec<CharacterRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), "快照文件解析失败，按空快照继续: {e}");
                return HashMap::new();
            }
        };
        info!(
            path = %self.path.display(),
            characters = records.len(),
            "🗂️ 已加载现有快照"
        );
        index_by_character_id(records)
    }

    /// 序列化完整记录列表并整体覆盖写入
    pub async fn save(&self, records: &[CharacterRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StoreError::IoError(format!("写入快照文件失败: {e}")))?;
        debug!(path = %self.path.display(), characters = records.len(), "💾 快照已持久化");
        Ok(())
    }
}
