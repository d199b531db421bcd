//! 组件基础接口定义
//!
//! 所有可以放入注册表的服务都实现 [`Component`]。释放能力和健康检查能力
//! 通过能力访问器在注册时探测，默认实现返回 `None`。

use crate::health::HealthCheckable;
use crate::lifecycle::Disposable;

/// 组件基础 trait
///
/// 以 trait 对象注册的服务接口应把 `Component` 作为 supertrait：
///
/// ```rust
/// use infrastructure_common::{BoxError, Component, Disposable};
///
/// trait Logger: Component {
///     fn log(&self, line: &str);
/// }
///
/// struct FileLogger;
///
/// impl Logger for FileLogger {
///     fn log(&self, _line: &str) {}
/// }
///
/// impl Disposable for FileLogger {
///     fn dispose(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// impl Component for FileLogger {
///     fn as_disposable(&self) -> Option<&dyn Disposable> {
///         Some(self)
///     }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// 组件名称，默认是类型名称
    fn component_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 释放能力
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }

    /// 健康检查能力
    fn as_health_check(&self) -> Option<&dyn HealthCheckable> {
        None
    }
}

/// 探测到的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// 是否可释放
    pub disposable: bool,
    /// 是否支持健康检查
    pub health_check: bool,
}

impl Capabilities {
    /// 探测组件实例的能力
    pub fn detect<T: Component + ?Sized>(component: &T) -> Self {
        Self {
            disposable: component.as_disposable().is_some(),
            health_check: component.as_health_check().is_some(),
        }
    }
}
