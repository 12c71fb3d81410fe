use enigo::{
    Direction::{Click, Press, Release},
    Enigo, Key, Keyboard, Settings,
};

use crate::error::AppError;

use super::KeystrokeInjector;

/// 基于 enigo 的按键注入：macOS 发送 Cmd+V，其余平台发送 Ctrl+V
#[derive(Debug, Default)]
pub struct EnigoInjector;

impl KeystrokeInjector for EnigoInjector {
    fn paste(&self) -> Result<(), AppError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| AppError::Input(format!("初始化输入模拟失败: {}", e)))?;

        #[cfg(target_os = "macos")]
        let modifier = Key::Meta;
        #[cfg(not(target_os = "macos"))]
        let modifier = Key::Control;

        enigo
            .key(modifier, Press)
            .and_then(|_| enigo.key(Key::Unicode('v'), Click))
            .and_then(|_| enigo.key(modifier, Release))
            .map_err(|e| AppError::Input(format!("模拟粘贴按键失败: {}", e)))
    }
}
