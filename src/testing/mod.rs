//! 测试基础设施
//!
//! 提供在不依赖上游 API 的情况下测试聚合器各组件的工具集。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockChatApi`] | 替代真实上游 API，脚本化分页/角色会话/角色详情三个端点 |
//! | [`fixtures`] | 构造原始会话记录的便捷函数 |
//!
//! # 设计原则
//!
//! - **零网络请求**：所有 Mock 都完全在内存中运行
//! - **可脚本化**：通过 `with_page()` / `with_character()` / `with_failing_*()` 精确控制返回值
//! - **可观测**：通过 `page_cursors()` / `conversation_calls()` 等方法检查调用情况

mod mock_api;

pub use mock_api::MockChatApi;

/// 原始会话记录的测试构造函数
pub mod fixtures {
    use crate::api::types::{RawCharacterSummary, RawConversation};

    /// 基础会话记录：无终止标记、无内嵌角色、消息数 1
    pub fn conversation(id: &str, character_id: &str) -> RawConversation {
        RawConversation {
            id: id.to_string(),
            character_id: character_id.to_string(),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            message_count: Some(1),
            num_messages: None,
            is_last_id: None,
            character: None,
        }
    }

    /// 带终止标记的会话记录（其 `character_id` 将成为下一页游标）
    pub fn terminal_conversation(id: &str, character_id: &str) -> RawConversation {
        RawConversation {
            is_last_id: Some(true),
            ..conversation(id, character_id)
        }
    }

    /// 带内嵌角色摘要的会话记录
    pub fn conversation_with_character(id: &str, character_id: &str, name: &str) -> RawConversation {
        RawConversation {
            character: Some(RawCharacterSummary {
                name: Some(name.to_string()),
                title: Some(format!("{} 的简介", name)),
                avatar_url: Some(format!("https://example.test/{}.png", character_id)),
            }),
            ..conversation(id, character_id)
        }
    }
}
