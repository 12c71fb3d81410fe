//! 代理运行配置
//!
//! # 设计思路
//!
//! 运行参数（数据目录、轮询间隔、粘贴延迟、失焦隐藏）与用户数据分开存放：
//! 用户数据进 SQLite，运行参数读自数据目录下的 `config.json`。
//! 配置文件缺失或损坏时整体回退默认值，不阻止代理启动。
//!
//! # 实现思路
//!
//! - 字段全部带 `#[serde(default)]`，部分字段缺失时逐字段回退。
//! - 数值型参数读入后再做区间收敛，避免极端值拖垮主循环。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const APP_DIR_NAME: &str = "clipshelf";
const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "clipshelf.db";

const POLL_INTERVAL_DEFAULT_MS: u64 = 1_000;
const POLL_INTERVAL_MIN_MS: u64 = 100;
const POLL_INTERVAL_MAX_MS: u64 = 10_000;
const PASTE_DELAY_DEFAULT_MS: u64 = 300;
const PASTE_DELAY_MAX_MS: u64 = 5_000;

/// 窗口默认尺寸（宽、高）
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (600, 400);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// 自定义数据目录；为空时使用系统数据目录下的 `clipshelf`
    pub data_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub paste_delay_ms: u64,
    /// 失焦自动隐藏；调试界面时可关闭
    pub hide_on_blur: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            poll_interval_ms: POLL_INTERVAL_DEFAULT_MS,
            paste_delay_ms: PASTE_DELAY_DEFAULT_MS,
            hide_on_blur: true,
        }
    }
}

fn normalize_poll_interval_ms(value_ms: u64) -> u64 {
    value_ms.clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
}

fn normalize_paste_delay_ms(value_ms: u64) -> u64 {
    value_ms.min(PASTE_DELAY_MAX_MS)
}

impl AgentConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(normalize_poll_interval_ms(self.poll_interval_ms))
    }

    pub fn paste_delay(&self) -> Duration {
        Duration::from_millis(normalize_paste_delay_ms(self.paste_delay_ms))
    }

    /// 数据目录：配置优先，其次系统数据目录
    pub fn resolve_data_dir(&self) -> Result<PathBuf, AppError> {
        if let Some(dir) = self.data_dir.as_ref().filter(|d| !d.as_os_str().is_empty()) {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| AppError::Persistence("获取系统数据目录失败".to_string()))
    }

    pub fn resolve_db_path(&self) -> Result<PathBuf, AppError> {
        Ok(self.resolve_data_dir()?.join(DB_FILE_NAME))
    }
}

/// 从指定路径加载配置；缺失或解析失败时返回默认配置
pub fn load_config_from_path(config_path: &Path) -> AgentConfig {
    if !config_path.exists() {
        return AgentConfig::default();
    }

    match fs::read_to_string(config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("解析配置文件失败，使用默认配置: {}", err);
                AgentConfig::default()
            }
        },
        Err(err) => {
            log::warn!("读取配置文件失败，使用默认配置: {}", err);
            AgentConfig::default()
        }
    }
}

/// 从系统数据目录加载配置
pub fn load_config() -> AgentConfig {
    match dirs::data_dir() {
        Some(dir) => load_config_from_path(&dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)),
        None => AgentConfig::default(),
    }
}

pub fn save_config_to_path(config_path: &Path, config: &AgentConfig) -> Result<(), AppError> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content)?;
    Ok(())
}
