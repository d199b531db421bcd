//! 服务解析器抽象接口
//!
//! 注册表和作用域都实现 [`ServiceResolver`]，自动装配只依赖这个 trait，
//! 因此同一个依赖声明既可以从根上下文解析，也可以从作用域解析。

use infrastructure_common::{Component, DependencyResult, Lifetime};
use std::sync::Arc;

/// 服务解析器 trait
pub trait ServiceResolver {
    /// 解析服务
    ///
    /// `T` 可以是具体类型，也可以是 `dyn Trait`。
    fn get_service<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + ?Sized;

    /// 解析服务，失败时返回 `None`
    fn try_get_service<T>(&self) -> Option<Arc<T>>
    where
        T: Component + ?Sized,
    {
        self.get_service::<T>().ok()
    }

    /// 检查是否已注册（任意生命周期）
    fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + 'static;

    /// 获取服务的生命周期，未注册时返回 [`Lifetime::Transient`]
    fn get_service_lifetime<T>(&self) -> Lifetime
    where
        T: ?Sized + 'static;
}
