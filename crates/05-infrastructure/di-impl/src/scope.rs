//! 服务作用域

use crate::context::ResolutionContext;
use crate::disposal::DisposalTracker;
use crate::registration::ServiceEntry;
use crate::registry::ServiceRegistry;
use chrono::{DateTime, Utc};
use di_abstractions::ServiceResolver;
use infrastructure_common::{
    Component, DependencyError, DependencyResult, Lifetime, ScopeState, TypeInfo,
};
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 服务作用域
///
/// 作用域服务在同一个作用域内只创建一次并被缓存，单例和瞬时服务
/// 委托给所属注册表。作用域只释放自己创建的实例，不会释放注册表的单例。
///
/// 状态机：`Created -> Active -> Disposed`，`Disposed` 为终态。
/// 作用域被 drop 时如果仍未释放，会自动释放。
pub struct ServiceScope<'r> {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    registry: &'r ServiceRegistry,
    state: ScopeState,
    cache: Mutex<HashMap<TypeId, ServiceEntry>>,
    disposables: Mutex<DisposalTracker>,
}

impl<'r> ServiceScope<'r> {
    pub(crate) fn new(registry: &'r ServiceRegistry, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
            registry,
            state: ScopeState::Created,
            cache: Mutex::new(HashMap::new()),
            disposables: Mutex::new(DisposalTracker::new()),
        }
    }

    pub(crate) fn activate(&mut self) {
        if self.state == ScopeState::Created {
            self.state = ScopeState::Active;
        }
    }

    /// 作用域 ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 作用域名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 当前状态
    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// 已缓存的作用域实例数量
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// 由本作用域负责释放的实例数量
    pub fn disposable_count(&self) -> usize {
        self.disposables.lock().len()
    }

    /// 所属注册表
    pub fn registry(&self) -> &'r ServiceRegistry {
        self.registry
    }

    fn ensure_not_disposed(&self) -> DependencyResult<()> {
        if self.state.is_disposed() {
            Err(DependencyError::disposed(format!("ServiceScope({})", self.name)))
        } else {
            Ok(())
        }
    }

    /// 解析服务
    pub fn get_service<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + ?Sized,
    {
        self.resolve_at::<T>(0)
    }

    /// 解析服务，失败时返回 `None`
    pub fn try_get_service<T>(&self) -> Option<Arc<T>>
    where
        T: Component + ?Sized,
    {
        self.get_service::<T>().ok()
    }

    pub(crate) fn resolve_at<T>(&self, depth: usize) -> DependencyResult<Arc<T>>
    where
        T: Component + ?Sized,
    {
        self.ensure_not_disposed()?;
        let type_info = TypeInfo::of::<T>();

        let cached = self
            .cache
            .lock()
            .get(&type_info.id)
            .map(|entry| entry.get::<Arc<T>>().map(Arc::clone));
        if let Some(hit) = cached {
            return hit;
        }

        let Some(factory) = self.registry.scoped_factory::<T>()? else {
            return self.registry.resolve_at::<T>(depth);
        };

        // 工厂执行期间不持有锁，工厂内部可以继续从本作用域解析
        let created = factory(&ResolutionContext::scoped(self, depth))?;

        let instance = {
            let mut cache = self.cache.lock();
            let entry = cache
                .entry(type_info.id)
                .or_insert_with(|| ServiceEntry::new(type_info, Arc::clone(&created)));
            Arc::clone(entry.get::<Arc<T>>()?)
        };

        if self.disposables.lock().track(type_info, &instance) {
            debug!("作用域 {} 跟踪可释放实例: {}", self.name, type_info);
        }
        Ok(instance)
    }

    /// 释放作用域
    ///
    /// 按创建顺序释放本作用域创建的实例。单个实例释放失败不会中断，
    /// 失败以 [`DependencyError::Disposal`] 汇总返回，作用域仍然进入 `Disposed`。
    pub fn dispose(&mut self) -> DependencyResult<()> {
        self.ensure_not_disposed()?;
        info!("释放作用域: {} ({})", self.name, self.id);

        let result = self.disposables.get_mut().dispose_all();
        self.cache.get_mut().clear();
        self.state = ScopeState::Disposed;

        result.map_err(DependencyError::from)
    }
}

impl Drop for ServiceScope<'_> {
    fn drop(&mut self) {
        if !self.state.is_disposed() {
            if let Err(e) = self.dispose() {
                error!("作用域释放时出错: {} - {}", self.name, e);
            }
        }
    }
}

impl std::fmt::Debug for ServiceScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceScope")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("state", &self.state)
            .field("cached", &self.cached_count())
            .finish()
    }
}

impl ServiceResolver for ServiceScope<'_> {
    fn get_service<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + ?Sized,
    {
        Self::get_service(self)
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
