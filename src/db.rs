//! 数据库模块
//!
//! # 设计思路
//!
//! 持久化层只提供"键 → JSON 文本"的存取，类型与默认值由 [`crate::store`]
//! 负责。使用 `rusqlite` 直接操作 SQLite：
//!
//! - **同步提交**：每次写入是一条独立的 UPSERT，返回前已落盘，
//!   进程在写入后立刻崩溃也不会出现内存与磁盘长期不一致。
//! - **按键容错**：单个键的值损坏只影响该键，其余键照常加载。

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::store::StoreBackend;

mod schema;

/// SQLite 键值存储后端
pub struct Database {
    conn: Connection,
}

impl Database {
    /// 打开（必要时创建）数据库文件并初始化 Schema
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!("创建数据库目录失败: {}", e))
            })?;
        }
        log::info!("数据库路径: {}", db_path.display());

        let conn = Connection::open(db_path).map_err(|e| {
            AppError::Database(format!("打开数据库失败: {}", e))
        })?;
        schema::initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// 打开内存数据库（测试与无盘运行使用）
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AppError::Database(format!("打开内存数据库失败: {}", e))
        })?;
        schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl StoreBackend for Database {
    fn load_all(&self) -> Result<Vec<(String, String)>, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM kv_store")
            .map_err(|e| AppError::Database(format!("准备查询失败: {}", e)))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| AppError::Database(format!("查询键值失败: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Database(format!("读取行失败: {}", e)))?;

        Ok(rows)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|e| AppError::Database(format!("写入键 '{}' 失败: {}", key, e)))?;
        Ok(())
    }
}
