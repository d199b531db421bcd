//! 类型擦除的注册项

use crate::context::ResolutionContext;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::Any;
use std::sync::Arc;

/// 作用域工厂：拿到当前解析上下文，产出实例
pub(crate) type ScopedFactoryFn<T> =
    Arc<dyn Fn(&ResolutionContext<'_>) -> DependencyResult<Arc<T>> + Send + Sync>;

/// 以 [`TypeId`](std::any::TypeId) 为键存放的值
///
/// 实例存 `Arc<T>`，工厂存 `FactoryFn<T>` / `ScopedFactoryFn<T>`，
/// 取出时按注册时的确切类型向下转型。
pub(crate) struct ServiceEntry {
    pub(crate) type_info: TypeInfo,
    value: Box<dyn Any + Send + Sync>,
}

impl ServiceEntry {
    pub(crate) fn new<V>(type_info: TypeInfo, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            type_info,
            value: Box::new(value),
        }
    }

    pub(crate) fn get<V: 'static>(&self) -> DependencyResult<&V> {
        self.value
            .downcast_ref::<V>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                type_name: self.type_info.full_name.to_string(),
            })
    }
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("type", &self.type_info.full_name)
            .finish()
    }
}
