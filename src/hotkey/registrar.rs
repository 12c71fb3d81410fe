//! 单槽位全局快捷键注册器
//!
//! 任何时刻最多只有一个快捷键注册到系统。换绑流程：
//!
//! 1. 先校验新字符串语法，不合法直接拒绝，系统状态不动
//! 2. 注销现有绑定
//! 3. 尝试注册新快捷键
//! 4. 成功 → 新快捷键成为当前绑定；失败 → 重新注册旧快捷键（回滚）并返回被拒绝的字符串
//!
//! 这样代理不会落入"没有任何可用快捷键"的状态，也不会悄悄接受系统拒绝的组合。

use crate::error::AppError;

use super::{Accelerator, ShortcutBackend};

pub struct HotkeyRegistrar {
    backend: Box<dyn ShortcutBackend>,
    /// 当前已注册到系统的快捷键（即 last-known-good）
    active: Option<Accelerator>,
}

impl HotkeyRegistrar {
    pub fn new(backend: Box<dyn ShortcutBackend>) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&Accelerator> {
        self.active.as_ref()
    }

    /// 启动时绑定持久化的快捷键
    ///
    /// 失败只记录日志，代理以"无快捷键"状态继续运行，直到用户成功换绑。
    pub fn bind_initial(&mut self, raw: &str) -> Option<Accelerator> {
        let accelerator = match raw.parse::<Accelerator>() {
            Ok(accelerator) => accelerator,
            Err(err) => {
                log::error!("持久化的快捷键不合法，暂不绑定: {}", err);
                return None;
            }
        };

        if let Err(reason) = self.backend.unregister_all() {
            log::warn!("清理旧快捷键失败: {}", reason);
        }

        match self.backend.register(&accelerator) {
            Ok(()) => {
                log::info!("⌨️  全局快捷键已绑定: {}", accelerator);
                self.active = Some(accelerator.clone());
                Some(accelerator)
            }
            Err(reason) => {
                log::error!("⌨️  全局快捷键 '{}' 绑定失败，当前无可用快捷键: {}", accelerator, reason);
                None
            }
        }
    }

    /// 换绑：先试注册，成功才提交，失败回滚到原绑定
    pub fn rebind(&mut self, raw: &str) -> Result<Accelerator, AppError> {
        let requested = raw.parse::<Accelerator>()?;

        if self.active.as_ref() == Some(&requested) {
            return Ok(requested);
        }

        if let Err(reason) = self.backend.unregister_all() {
            log::warn!("注销旧快捷键失败: {}", reason);
        }

        match self.backend.register(&requested) {
            Ok(()) => {
                log::info!(
                    "⌨️  快捷键已换绑: {} -> {}",
                    self.active.as_ref().map(ToString::to_string).unwrap_or_else(|| "<none>".to_string()),
                    requested
                );
                self.active = Some(requested.clone());
                Ok(requested)
            }
            Err(reason) => {
                log::warn!("⌨️  系统拒绝快捷键 '{}': {}，回滚", requested, reason);
                self.roll_back();
                Err(AppError::HotkeyRejected {
                    accelerator: raw.to_string(),
                    reason,
                })
            }
        }
    }

    fn roll_back(&mut self) {
        let Some(previous) = self.active.clone() else {
            return;
        };
        if let Err(reason) = self.backend.register(&previous) {
            log::error!("⌨️  回滚快捷键 '{}' 失败，当前无可用快捷键: {}", previous, reason);
            self.active = None;
        }
    }

    /// 释放系统绑定（进程退出时调用）
    pub fn release(&mut self) {
        if let Err(reason) = self.backend.unregister_all() {
            log::warn!("退出前清理全局快捷键失败: {}", reason);
        }
        if let Some(accelerator) = self.active.take() {
            log::info!("⌨️  全局快捷键已释放: {}", accelerator);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// 记录系统侧注册状态的假后端，可指定必定失败的组合
    #[derive(Clone, Default)]
    struct FakeBackend {
        registered: Arc<Mutex<Vec<String>>>,
        refuse: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        fn registered(&self) -> Vec<String> {
            self.registered.lock().unwrap().clone()
        }

        fn refuse(&self, accel: &str) {
            self.refuse.lock().unwrap().push(accel.to_string());
        }
    }

    impl ShortcutBackend for FakeBackend {
        fn register(&mut self, accelerator: &Accelerator) -> Result<(), String> {
            let name = accelerator.to_string();
            if self.refuse.lock().unwrap().contains(&name) {
                return Err("already registered by another application".to_string());
            }
            self.registered.lock().unwrap().push(name);
            Ok(())
        }

        fn unregister_all(&mut self) -> Result<(), String> {
            self.registered.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn initial_bind_registers_single_shortcut() {
        let backend = FakeBackend::default();
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));

        assert!(registrar.bind_initial("Command+Shift+V").is_some());
        assert_eq!(backend.registered(), vec!["Command+Shift+V"]);
    }

    #[test]
    fn initial_bind_failure_leaves_agent_without_hotkey() {
        let backend = FakeBackend::default();
        backend.refuse("Command+Shift+V");
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));

        assert!(registrar.bind_initial("Command+Shift+V").is_none());
        assert!(registrar.active().is_none());
        assert!(backend.registered().is_empty());
    }

    #[test]
    fn successful_rebind_replaces_binding() {
        let backend = FakeBackend::default();
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));
        registrar.bind_initial("Command+Shift+V");

        let bound = registrar.rebind("Alt+Space").unwrap();
        assert_eq!(bound.to_string(), "Alt+Space");
        assert_eq!(backend.registered(), vec!["Alt+Space"]);
    }

    #[test]
    fn refused_rebind_rolls_back() {
        let backend = FakeBackend::default();
        backend.refuse("Control+C");
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));
        registrar.bind_initial("Command+Shift+V");

        let err = registrar.rebind("Control+C").unwrap_err();
        assert_eq!(err.rejected_accelerator(), Some("Control+C"));
        assert_eq!(backend.registered(), vec!["Command+Shift+V"]);
        assert_eq!(registrar.active().unwrap().to_string(), "Command+Shift+V");
    }

    #[test]
    fn invalid_rebind_never_touches_backend() {
        let backend = FakeBackend::default();
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));
        registrar.bind_initial("Command+Shift+V");

        let err = registrar.rebind("Command+Shift").unwrap_err();
        assert!(matches!(err, AppError::InvalidAccelerator { .. }));
        assert_eq!(backend.registered(), vec!["Command+Shift+V"]);
    }

    #[test]
    fn rebind_recovers_hotkeyless_agent() {
        let backend = FakeBackend::default();
        backend.refuse("Command+Shift+V");
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));
        registrar.bind_initial("Command+Shift+V");

        registrar.rebind("Alt+V").unwrap();
        assert_eq!(backend.registered(), vec!["Alt+V"]);
    }

    #[test]
    fn release_unregisters_everything() {
        let backend = FakeBackend::default();
        let mut registrar = HotkeyRegistrar::new(Box::new(backend.clone()));
        registrar.bind_initial("Alt+V");

        registrar.release();
        assert!(backend.registered().is_empty());
        assert!(registrar.active().is_none());
    }
}
