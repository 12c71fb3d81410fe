//! Schema 初始化子模块
//!
//! ## 职责
//! - 设置 SQLite 运行参数（WAL、同步落盘）
//! - 按 `PRAGMA user_version` 依次执行尚未应用的迁移（目前只有 `kv_store` 一张表）
//! - 拒绝打开由更新版本创建的数据库
//!
//! ## 错误语义
//! - DDL 失败统一映射为 `AppError::Database`

use rusqlite::Connection;

use crate::error::AppError;

/// 按版本顺序执行的迁移脚本；第 N 项把库从版本 N 升到 N+1
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );",
];

pub(super) const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

fn schema_version(conn: &Connection) -> Result<i64, AppError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| AppError::Database(format!("读取 schema 版本失败: {}", e)))
}

pub(super) fn initialize_schema(conn: &Connection) -> Result<(), AppError> {
    // 两个参数分开设置：内存库不支持 WAL，但同步级别仍要生效
    match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0)) {
        Ok(mode) if !mode.eq_ignore_ascii_case("wal") => {
            log::debug!("当前数据库不支持 WAL，日志模式为 {}", mode);
        }
        Ok(_) => {}
        Err(e) => log::warn!("启用 WAL 失败，继续使用默认日志模式: {}", e),
    }
    if let Err(e) = conn.pragma_update(None, "synchronous", "FULL") {
        log::warn!("设置 synchronous=FULL 失败: {}", e);
    }

    let current = schema_version(conn)?;
    if !(0..=SCHEMA_VERSION).contains(&current) {
        return Err(AppError::Database(format!(
            "无法识别的数据库版本: current={}, supported=0..={}",
            current, SCHEMA_VERSION
        )));
    }

    for (index, script) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let target = index as i64 + 1;
        conn.execute_batch(script)
            .and_then(|()| conn.pragma_update(None, "user_version", target))
            .map_err(|e| AppError::Database(format!("迁移到 v{} 失败: {}", target, e)))?;
        log::info!("数据库 schema 已升级到 v{}", target);
    }

    Ok(())
}
