//! 粘贴编排与按键注入
//!
//! 粘贴顺序固定为：
//!
//! 1. 内容写入系统剪贴板
//! 2. 刷新剪贴板监控的 `last_observed`，自身写入不会被再次记为历史
//! 3. 隐藏面板，把焦点还给之前的应用
//! 4. 等待 `paste_delay`（默认 300ms）后注入一次"粘贴"按键
//!
//! 第 4 步在独立任务中执行，不阻塞主循环，排定后不可取消；
//! 注入失败只记录日志，内容已在剪贴板上，用户仍可手动粘贴。

#[cfg(feature = "enigo")]
mod enigo_injector;

#[cfg(feature = "enigo")]
pub use enigo_injector::EnigoInjector;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::clipboard::{ClipboardWatcher, SystemClipboard};
use crate::error::AppError;
use crate::window_position::WindowPositioner;

/// 系统按键注入端口（阻塞调用，在 blocking 线程池中执行）
pub trait KeystrokeInjector: Send + Sync {
    /// 向当前焦点应用发送一次"粘贴"组合键
    fn paste(&self) -> Result<(), AppError>;
}

/// 不注入任何按键，仅记录日志
#[derive(Debug, Default)]
pub struct LoggingInjector;

impl KeystrokeInjector for LoggingInjector {
    fn paste(&self) -> Result<(), AppError> {
        log::info!("当前运行模式不注入按键，内容已在剪贴板，请手动粘贴");
        Ok(())
    }
}

pub struct PasteSequencer {
    injector: Arc<dyn KeystrokeInjector>,
    delay: Duration,
}

impl PasteSequencer {
    pub fn new(injector: Arc<dyn KeystrokeInjector>, delay: Duration) -> Self {
        Self { injector, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 执行一次粘贴
    ///
    /// 剪贴板写入失败时整个流程中止（不隐藏、不注入）并返回错误；
    /// 隐藏失败只记录日志，注入照常排定。
    pub fn execute(
        &self,
        content: &str,
        clipboard: &mut dyn SystemClipboard,
        watcher: &mut ClipboardWatcher,
        positioner: &mut WindowPositioner,
    ) -> Result<JoinHandle<()>, AppError> {
        clipboard.write_text(content)?;
        watcher.note_self_write(content);
        log::debug!("📋 已写入剪贴板 {} 个字符，准备粘贴", content.chars().count());

        if let Err(e) = positioner.hide() {
            log::warn!("粘贴前隐藏面板失败: {}", e);
        }

        Ok(self.schedule_injection())
    }

    fn schedule_injection(&self) -> JoinHandle<()> {
        let injector = Arc::clone(&self.injector);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match tokio::task::spawn_blocking(move || injector.paste()).await {
                Ok(Ok(())) => log::debug!("⌨️  已注入粘贴按键"),
                Ok(Err(e)) => log::warn!("⌨️  粘贴按键注入失败，内容仍在剪贴板: {}", e),
                Err(e) => log::error!("⌨️  粘贴注入任务异常退出: {}", e),
            }
        })
    }
}
