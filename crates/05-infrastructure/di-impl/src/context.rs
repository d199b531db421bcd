//! 解析上下文与自动装配

use crate::registry::ServiceRegistry;
use crate::scope::ServiceScope;
use di_abstractions::ServiceResolver;
use infrastructure_common::{Component, DependencyError, DependencyResult, Lifetime, TypeInfo};
use std::sync::Arc;

/// 正在进行的一次解析所处的上下文
///
/// 从注册表直接解析时没有作用域（根上下文）；从作用域解析时，
/// 工厂内部再解析的依赖同样落在该作用域中并被其缓存。
#[derive(Clone, Copy)]
pub struct ResolutionContext<'a> {
    registry: &'a ServiceRegistry,
    scope: Option<&'a ServiceScope<'a>>,
    depth: usize,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn root(registry: &'a ServiceRegistry, depth: usize) -> Self {
        Self {
            registry,
            scope: None,
            depth,
        }
    }

    pub(crate) fn scoped(scope: &'a ServiceScope<'a>, depth: usize) -> Self {
        Self {
            registry: scope.registry(),
            scope: Some(scope),
            depth,
        }
    }

    /// 当前作用域，根上下文为 `None`
    pub fn scope(&self) -> Option<&'a ServiceScope<'a>> {
        self.scope
    }

    /// 所属注册表
    pub fn registry(&self) -> &'a ServiceRegistry {
        self.registry
    }

    /// 当前解析深度（从 0 开始）
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 是否为根上下文
    pub fn is_root(&self) -> bool {
        self.scope.is_none()
    }
}

impl std::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("scope", &self.scope.map(|s| s.name()))
            .field("depth", &self.depth)
            .finish()
    }
}

impl ServiceResolver for ResolutionContext<'_> {
    fn get_service<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + ?Sized,
    {
        let depth = self.depth + 1;
        let max_depth = self.registry.config().max_resolution_depth;
        if depth > max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                type_name: TypeInfo::of::<T>().full_name.to_string(),
                max_depth,
            });
        }

        match self.scope {
            Some(scope) => scope.resolve_at::<T>(depth),
            None => self.registry.resolve_at::<T>(depth),
        }
    }

    fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.registry.is_registered::<T>()
    }

    fn get_service_lifetime<T>(&self) -> Lifetime
    where
        T: ?Sized + 'static,
    {
        self.registry.get_service_lifetime::<T>()
    }
}
