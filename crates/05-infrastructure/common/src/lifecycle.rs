//! 服务生命周期管理

use crate::errors::BoxError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 服务生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifetime {
    /// 单例模式 - 注册表生命周期内共享同一个实例
    Singleton,
    /// 作用域模式 - 在同一作用域内共享实例
    Scoped,
    /// 瞬时模式 - 每次解析都创建新实例（工厂注册）
    #[default]
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Singleton => "Singleton",
            Self::Scoped => "Scoped",
            Self::Transient => "Transient",
        };
        f.write_str(name)
    }
}

/// 资源释放能力
///
/// 实例以 `Arc` 共享，因此释放钩子只拿到 `&self`，
/// 需要修改内部状态的实现应使用内部可变性。
pub trait Disposable: Send + Sync {
    /// 释放资源
    fn dispose(&self) -> Result<(), BoxError>;
}

/// 作用域状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeState {
    /// 已创建，尚未交给调用方
    #[default]
    Created,
    /// 正常使用中
    Active,
    /// 已释放（终态）
    Disposed,
}

impl ScopeState {
    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}
