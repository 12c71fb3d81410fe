//! 快捷键字符串解析
//!
//! 语法：零个或多个修饰键（`Command` / `Control` / `Alt` / `Shift`，顺序任意），
//! 以 `+` 连接，最后是恰好一个非修饰键。只有修饰键的组合不合法，
//! 必须在注册到系统之前就被拒绝。
//!
//! 解析大小写不敏感，并接受常见别名（`Cmd`、`Ctrl`、`Option`）；
//! `Display` 输出规范形式，修饰键按 Command、Control、Alt、Shift 排序。

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Command,
    Control,
    Alt,
    Shift,
}

impl Modifier {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "command" | "cmd" => Some(Modifier::Command),
            "control" | "ctrl" => Some(Modifier::Control),
            "alt" | "option" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Command => "Command",
            Modifier::Control => "Control",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
        }
    }
}

/// 已校验的快捷键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Accelerator {
    modifiers: Vec<Modifier>,
    key: String,
}

impl Accelerator {
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn invalid(raw: &str, reason: &str) -> AppError {
    AppError::InvalidAccelerator {
        accelerator: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// 单字符键统一大写，具名键（`Space`、`F5`）保持首字母大写
fn normalize_key(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl FromStr for Accelerator {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = raw.split('+').map(str::trim).collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(invalid(raw, "存在空的按键片段"));
        }

        let Some((key, modifier_tokens)) = tokens.split_last() else {
            return Err(invalid(raw, "快捷键为空"));
        };

        if Modifier::parse(key).is_some() {
            return Err(invalid(raw, "缺少非修饰键"));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(invalid(raw, "按键名不能包含空白"));
        }

        let mut modifiers = Vec::with_capacity(modifier_tokens.len());
        for token in modifier_tokens {
            let modifier = Modifier::parse(token)
                .ok_or_else(|| invalid(raw, &format!("'{}' 不是修饰键", token)))?;
            if modifiers.contains(&modifier) {
                return Err(invalid(raw, &format!("修饰键 '{}' 重复", modifier.as_str())));
            }
            modifiers.push(modifier);
        }
        modifiers.sort();

        Ok(Self {
            modifiers,
            key: normalize_key(key),
        })
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        f.write_str(&self.key)
    }
}
