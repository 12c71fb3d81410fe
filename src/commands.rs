//! 展示层 → 代理的命令
//!
//! 命令是即发即忘、至多一次送达的：调用方拿不到返回值，结果通过事件总线回推。
//! 所有命令对重复投递都是安全的，例如删除不存在的条目只是空操作。

use serde::Deserialize;

use crate::events::SubscriberId;
use crate::models::{HistoryItem, ItemId, NewSnippet, SettingsPatch, SnippetEdit, WindowBounds};
use crate::window_position::BoundsChange;

/// 展示层可以发出的命令
///
/// JSON 形如 `{"command": "delete-item", "payload": "<id>"}`，无负载的命令省略 `payload`。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "kebab-case")]
pub enum UiCommand {
    PasteItem(HistoryItem),
    DeleteItem(ItemId),
    ClearHistory,
    HideWindow,
    GetShortcut,
    UpdateShortcut(String),
    UpdateSettings(SettingsPatch),
    AddSnippet(NewSnippet),
    UpdateSnippet(SnippetEdit),
    DeleteSnippet(ItemId),
    CopySnippet(String),
}

/// 主循环处理的全部输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCommand {
    Ui(UiCommand),
    /// 全局快捷键触发
    HotkeyPressed,
    /// 面板失去焦点
    WindowBlurred,
    /// 面板被移动或缩放，附带事件发生后读到的外框
    WindowBoundsChanged(BoundsChange, WindowBounds),
    /// 新订阅者接入，需要推送全量快照
    SyncSubscriber(SubscriberId),
    Shutdown,
}

impl From<UiCommand> for AgentCommand {
    fn from(command: UiCommand) -> Self {
        AgentCommand::Ui(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payload_commands() {
        let cmd: UiCommand =
            serde_json::from_str(r#"{"command":"delete-item","payload":"abc"}"#).unwrap();
        assert_eq!(cmd, UiCommand::DeleteItem("abc".into()));

        let cmd: UiCommand = serde_json::from_str(
            r#"{"command":"update-settings","payload":{"followCursor":false}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            UiCommand::UpdateSettings(SettingsPatch { follow_cursor: Some(false) })
        );
    }

    #[test]
    fn parses_unit_commands_without_payload() {
        let cmd: UiCommand = serde_json::from_str(r#"{"command":"clear-history"}"#).unwrap();
        assert_eq!(cmd, UiCommand::ClearHistory);
    }

    #[test]
    fn paste_item_accepts_history_item_shape() {
        let raw = r#"{"command":"paste-item","payload":{"id":"1","content":"hi","capturedAt":7}}"#;
        let UiCommand::PasteItem(item) = serde_json::from_str(raw).unwrap() else {
            panic!("expected paste-item");
        };
        assert_eq!(item.content, "hi");
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<UiCommand>(r#"{"command":"format-disk"}"#).is_err());
    }
}
