//! 代理主循环
//!
//! # 设计思路
//!
//! 单一所有者事件循环：剪贴板轮询定时器与命令通道在同一个
//! `tokio::select!` 中交替处理，快捷键回调、窗口事件、界面命令
//! 都先转换成 [`AgentCommand`] 投递进来，从不直接触碰状态。
//! 唯一真正并发的是粘贴按键注入，它不访问共享状态。
//!
//! # 实现思路
//!
//! - [`AgentHandle`] 可克隆、即发即忘，适合在同步回调中使用。
//! - 定时器错过的拍子直接跳过，不会在主循环繁忙后集中补拍。
//! - 收到 `Shutdown` 或全部句柄被释放时退出循环，并释放系统快捷键。

use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::agent::AgentCore;
use crate::commands::AgentCommand;
use crate::error::AppError;
use crate::events::{AgentEvent, EventBus, Subscription};

/// 向主循环投递命令的句柄
#[derive(Clone)]
pub struct AgentHandle {
    tx: UnboundedSender<AgentCommand>,
    bus: EventBus,
}

impl AgentHandle {
    /// 投递命令；主循环已退出时返回 `ChannelClosed`
    pub fn send(&self, command: impl Into<AgentCommand>) -> Result<(), AppError> {
        self.tx
            .send(command.into())
            .map_err(|_| AppError::ChannelClosed)
    }

    /// 订阅事件，并请求主循环立即推送全量快照
    pub fn subscribe(&self) -> Result<(Subscription, Receiver<AgentEvent>), AppError> {
        let (subscription, rx) = self.bus.subscribe();
        self.send(AgentCommand::SyncSubscriber(subscription.id()))?;
        Ok((subscription, rx))
    }

    pub fn shutdown(&self) -> Result<(), AppError> {
        self.send(AgentCommand::Shutdown)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

pub struct AgentRuntime {
    core: AgentCore,
    rx: UnboundedReceiver<AgentCommand>,
}

impl AgentRuntime {
    pub fn new(core: AgentCore) -> (Self, AgentHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = AgentHandle {
            tx,
            bus: core.bus().clone(),
        };
        (Self { core, rx }, handle)
    }

    /// 运行直到收到 `Shutdown`；返回核心以便调用方检查最终状态
    pub async fn run(mut self) -> AgentCore {
        let poll_interval = self.core.config().poll_interval();
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!("🚀 代理主循环启动，剪贴板轮询间隔 {}ms", poll_interval.as_millis());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.core.poll_clipboard();
                }

                command = self.rx.recv() => {
                    match command {
                        Some(command) => {
                            if self.core.handle_command(command).await.is_break() {
                                break;
                            }
                        }
                        None => {
                            log::info!("所有代理句柄已释放，主循环退出");
                            self.core.shutdown();
                            break;
                        }
                    }
                }
            }
        }

        self.core
    }
}
