//! 光标位置读取（带重试）
//!
//! # 设计思路
//!
//! - 平台差异下沉到 [`Surface`] 实现，这里只负责重试与回退。
//! - 可用性兜底：连续失败时回退到主显示器中心，保证定位流程可继续执行。
//!
//! # 重试策略
//! - 最大尝试次数：3 次
//! - 退避延迟：10ms、20ms（指数退避）
//! - 最终回退：主显示器工作区中心，其次 `(0, 0)`

use std::time::Duration;

use super::{Point, Rect, Surface};

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_DELAY_MS: u64 = 10;

/// 读取光标位置，失败时重试并最终回退
///
/// * `fallback_area` - 回退时使用其中心点，一般传主显示器工作区
pub async fn cursor_position_with_retry(surface: &mut dyn Surface, fallback_area: Option<Rect>) -> Point {
    let mut delay_ms = INITIAL_DELAY_MS;

    for attempt in 0..MAX_ATTEMPTS {
        match surface.cursor_position() {
            Ok(pos) => {
                if attempt > 0 {
                    log::debug!("第 {} 次尝试读取光标位置成功", attempt + 1);
                }
                return pos;
            }
            Err(e) => {
                log::warn!("读取光标位置失败 (第 {} 次): {}", attempt + 1, e);

                if attempt < MAX_ATTEMPTS - 1 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms *= 2;
                }
            }
        }
    }

    log::warn!("所有获取光标位置的尝试均失败，回退到屏幕中心。");

    match fallback_area {
        Some(area) => area.center(),
        None => {
            log::warn!("没有可用的显示器信息，使用原点 (0, 0) 作为回退。");
            Point::new(0, 0)
        }
    }
}
