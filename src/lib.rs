//! # clipshelf：剪贴板历史与片段代理
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  展示层（Tauri 前端 / 任意订阅者）          │
//! │        history-update · snippets-update · shortcut-*     │
//! └───────┬──────────────────────────────────────▲───────────┘
//!         │ UiCommand（即发即忘）                  │ AgentEvent（全量快照）
//! ┌───────▼──────────────────────────────────────┼───────────┐
//! │  runtime ── AgentRuntime（单一所有者主循环）  events::EventBus │
//! │     │  ▲ tick                 ▲ HotkeyPressed / 窗口事件  │
//! │     ▼  │                      │                          │
//! │  agent::AgentCore                                        │
//! │   ├─ store ─────────── PersistentStore → db (SQLite)     │
//! │   ├─ history / snippets                                  │
//! │   ├─ clipboard ─────── ClipboardWatcher（轮询 + 自写忽略）  │
//! │   ├─ hotkey ────────── HotkeyRegistrar（试注册 + 回滚）     │
//! │   ├─ window_position ─ WindowPositioner（Hidden/Visible） │
//! │   └─ input ─────────── PasteSequencer（写入→隐藏→延迟粘贴）  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`models`] | 历史条目、片段、窗口外框、设置 |
//! | [`config`] | 运行参数（数据目录、轮询间隔、粘贴延迟） |
//! | [`db`] | SQLite 键值表 |
//! | [`store`] | 带默认值的类型化持久存储 |
//! | [`history`] | 有界、去重的剪贴板历史 |
//! | [`snippets`] | 片段增删改 |
//! | [`clipboard`] | 系统剪贴板端口与轮询监控 |
//! | [`hotkey`] | 快捷键语法与单槽位注册器 |
//! | [`window_position`] | 多显示器定位与面板状态机 |
//! | [`events`] / [`commands`] | 代理与展示层之间的消息 |
//! | [`input`] | 粘贴编排与按键注入 |
//! | [`agent`] / [`runtime`] | 状态聚合与主循环 |

pub mod error;
pub mod models;
pub mod config;
pub mod db;
pub mod store;
pub mod history;
pub mod snippets;
pub mod clipboard;
pub mod hotkey;
pub mod window_position;
pub mod events;
pub mod commands;
pub mod input;
pub mod agent;
pub mod runtime;

#[cfg(feature = "tauri")]
pub mod tauri_shell;

pub use agent::{AgentCore, AgentPorts};
pub use error::AppError;
pub use runtime::{AgentHandle, AgentRuntime};
