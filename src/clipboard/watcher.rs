//! 剪贴板轮询监控
//!
//! 每一拍读取一次剪贴板文本，与 `last_observed` 比较：
//! 非空且不同即为一次外部变化。代理自身写入剪贴板时调用
//! [`ClipboardWatcher::note_self_write`]，使该内容不会在下一拍被当作新捕获。

use super::SystemClipboard;

/// 单拍轮询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 外部应用写入了新文本
    Changed(String),
    /// 剪贴板内容与上次观测一致（或为空）
    Unchanged,
    /// 读取失败，本拍跳过
    ReadFailed,
}

#[derive(Debug, Default)]
pub struct ClipboardWatcher {
    last_observed: Option<String>,
}

impl ClipboardWatcher {
    /// 以启动时的剪贴板内容作为基线，避免把启动前已有的内容记成新历史
    pub fn seeded(clipboard: &mut dyn SystemClipboard) -> Self {
        let last_observed = match clipboard.read_text() {
            Ok(text) => text,
            Err(err) => {
                log::warn!("启动时读取剪贴板失败，基线置空: {}", err);
                None
            }
        };
        Self { last_observed }
    }

    pub fn last_observed(&self) -> Option<&str> {
        self.last_observed.as_deref()
    }

    /// 记录一次代理自身写入
    pub fn note_self_write(&mut self, text: &str) {
        self.last_observed = Some(text.to_string());
    }

    /// 比较一次读取结果；返回需要记录的新文本
    pub fn observe(&mut self, text: Option<String>) -> Option<String> {
        let text = text.filter(|t| !t.is_empty())?;
        if self.last_observed.as_deref() == Some(text.as_str()) {
            return None;
        }
        self.last_observed = Some(text.clone());
        Some(text)
    }

    /// 执行一拍轮询
    pub fn poll(&mut self, clipboard: &mut dyn SystemClipboard) -> PollOutcome {
        match clipboard.read_text() {
            Ok(text) => match self.observe(text) {
                Some(changed) => PollOutcome::Changed(changed),
                None => PollOutcome::Unchanged,
            },
            Err(err) => {
                log::debug!("剪贴板读取失败，跳过本拍: {}", err);
                PollOutcome::ReadFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    struct ScriptedClipboard {
        reads: Vec<Result<Option<String>, AppError>>,
    }

    impl SystemClipboard for ScriptedClipboard {
        fn read_text(&mut self) -> Result<Option<String>, AppError> {
            if self.reads.is_empty() {
                return Ok(None);
            }
            self.reads.remove(0)
        }

        fn write_text(&mut self, _text: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn startup_content_is_not_captured() {
        let mut clipboard = ScriptedClipboard {
            reads: vec![Ok(Some("before".into())), Ok(Some("before".into()))],
        };
        let mut watcher = ClipboardWatcher::seeded(&mut clipboard);
        assert_eq!(watcher.poll(&mut clipboard), PollOutcome::Unchanged);
    }

    #[test]
    fn external_change_is_reported_once() {
        let mut clipboard = ScriptedClipboard {
            reads: vec![Ok(Some("new".into())), Ok(Some("new".into()))],
        };
        let mut watcher = ClipboardWatcher::default();
        assert_eq!(watcher.poll(&mut clipboard), PollOutcome::Changed("new".into()));
        assert_eq!(watcher.poll(&mut clipboard), PollOutcome::Unchanged);
    }

    #[test]
    fn self_write_is_suppressed() {
        let mut watcher = ClipboardWatcher::default();
        watcher.note_self_write("pasted");
        assert_eq!(watcher.observe(Some("pasted".into())), None);
        assert_eq!(watcher.observe(Some("typed".into())), Some("typed".into()));
    }

    #[test]
    fn empty_text_never_captured() {
        let mut watcher = ClipboardWatcher::default();
        assert_eq!(watcher.observe(Some(String::new())), None);
        assert_eq!(watcher.observe(None), None);
    }

    #[test]
    fn read_failure_skips_tick_and_recovers() {
        let mut clipboard = ScriptedClipboard {
            reads: vec![
                Err(AppError::Clipboard("busy".into())),
                Ok(Some("later".into())),
            ],
        };
        let mut watcher = ClipboardWatcher::default();
        assert_eq!(watcher.poll(&mut clipboard), PollOutcome::ReadFailed);
        assert_eq!(watcher.poll(&mut clipboard), PollOutcome::Changed("later".into()));
    }

    #[test]
    fn seeding_survives_read_failure() {
        let mut clipboard = ScriptedClipboard {
            reads: vec![Err(AppError::Clipboard("no display".into()))],
        };
        let watcher = ClipboardWatcher::seeded(&mut clipboard);
        assert_eq!(watcher.last_observed(), None);
    }
}
