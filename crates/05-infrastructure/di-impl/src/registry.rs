//! 服务注册表
//!
//! 组合根：负责注册、根级解析、释放跟踪、健康检查聚合以及创建作用域。

use crate::context::ResolutionContext;
use crate::disposal::DisposalTracker;
use crate::registration::{ScopedFactoryFn, ServiceEntry};
use crate::scope::ServiceScope;
use di_abstractions::{construct, ContainerConfig, FactoryFn, Injectable, RegistryStats, ServiceResolver};
use infrastructure_common::{
    AggregateHealthChecker, BoxError, Capabilities, Component, DependencyError, DependencyResult,
    HealthReport, Lifetime, TypeInfo,
};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const REGISTRY_NAME: &str = "ServiceRegistry";

/// 服务注册表
///
/// 每个服务类型只能出现在三个存储（实例、工厂、作用域工厂）之一中。
/// 注册需要 `&mut self`，解析只需要 `&self`；作用域借用注册表，
/// 因此作用域存活期间注册表既不能被清空也不能被释放。
pub struct ServiceRegistry {
    /// 单例实例
    instances: HashMap<TypeId, ServiceEntry>,
    /// 瞬时工厂
    factories: HashMap<TypeId, ServiceEntry>,
    /// 作用域工厂
    scoped_factories: HashMap<TypeId, ServiceEntry>,
    /// 生命周期（用于查询和重复检测）
    lifetimes: HashMap<TypeId, Lifetime>,
    /// 注册顺序
    registration_order: Vec<TypeInfo>,
    /// 注册表拥有的可释放单例
    disposables: DisposalTracker,
    /// 注册表拥有的健康检查
    health_checks: AggregateHealthChecker,
    config: ContainerConfig,
    disposed: bool,
}

impl ServiceRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建注册表
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            instances: HashMap::new(),
            factories: HashMap::new(),
            scoped_factories: HashMap::new(),
            lifetimes: HashMap::new(),
            registration_order: Vec::new(),
            disposables: DisposalTracker::new(),
            health_checks: AggregateHealthChecker::new(),
            config,
            disposed: false,
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_not_disposed(&self) -> DependencyResult<()> {
        if self.disposed {
            Err(DependencyError::disposed(REGISTRY_NAME))
        } else {
            Ok(())
        }
    }

    fn warn_if_disposed(&self, operation: &str, type_info: TypeInfo) {
        if self.disposed {
            warn!("在已释放的注册表上调用 {}: {}", operation, type_info);
        }
    }

    fn begin_registration(&mut self, type_info: TypeInfo, lifetime: Lifetime) -> DependencyResult<()> {
        self.ensure_not_disposed()?;

        if let Some(existing) = self.lifetimes.get(&type_info.id) {
            warn!("服务重复注册被拒绝: {} (已注册为 {})", type_info, existing);
            return Err(DependencyError::DuplicateRegistration {
                type_name: type_info.full_name.to_string(),
                existing: existing.to_string(),
            });
        }

        self.lifetimes.insert(type_info.id, lifetime);
        self.registration_order.push(type_info);
        info!("注册服务: {} ({})", type_info.short_name(), lifetime);
        Ok(())
    }

    // ---- 注册 ----

    /// 注册单例实例
    ///
    /// 以接口注册时显式指定 `T`，例如
    /// `register_singleton::<dyn Logger>(Arc::new(ConsoleLogger))`。
    /// 实例具备释放能力时进入释放跟踪，具备健康检查能力时进入健康检查聚合。
    pub fn register_singleton<T>(&mut self, instance: Arc<T>) -> DependencyResult<()>
    where
        T: Component + ?Sized,
    {
        let type_info = TypeInfo::of::<T>();
        self.begin_registration(type_info, Lifetime::Singleton)?;

        let capabilities = Capabilities::detect(instance.as_ref());
        if capabilities.disposable {
            self.disposables.track(type_info, &instance);
        }
        if capabilities.health_check {
            let probe_target = Arc::clone(&instance);
            self.health_checks.add_checker(type_info.full_name, move || {
                probe_target
                    .as_health_check()
                    .filter(|check| check.is_enabled())
                    .map(|check| check.check_health())
            });
        }
        debug!("单例能力: {} {:?}", type_info, capabilities);

        self.instances
            .insert(type_info.id, ServiceEntry::new(type_info, instance));
        Ok(())
    }

    /// 注册单例实例（自动包装为 `Arc`）
    pub fn register_instance<T>(&mut self, instance: T) -> DependencyResult<()>
    where
        T: Component,
    {
        self.register_singleton(Arc::new(instance))
    }

    /// 注册瞬时工厂，每次解析都会调用
    pub fn register_factory<T, F>(&mut self, factory: F) -> DependencyResult<()>
    where
        T: Component + ?Sized,
        F: Fn() -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<T>();
        self.begin_registration(type_info, Lifetime::Transient)?;

        let factory: FactoryFn<T> = Arc::new(factory);
        self.factories
            .insert(type_info.id, ServiceEntry::new(type_info, factory));
        Ok(())
    }

    /// 注册作用域工厂（不需要作用域参数）
    pub fn register_scoped<T, F>(&mut self, factory: F) -> DependencyResult<()>
    where
        T: Component + ?Sized,
        F: Fn() -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<T>();
        self.insert_scoped::<T, _>(
            type_info,
            move |_ctx: &ResolutionContext<'_>| {
                factory().map_err(|e| DependencyError::creation(type_info.full_name, e))
            },
        )
    }

    /// 注册作用域工厂，工厂可以拿到正在解析的作用域
    ///
    /// 从注册表直接解析时作用域参数为 `None`。
    pub fn register_scoped_with_scope<T, F>(&mut self, factory: F) -> DependencyResult<()>
    where
        T: Component + ?Sized,
        F: Fn(Option<&ServiceScope<'_>>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<T>();
        self.insert_scoped::<T, _>(
            type_info,
            move |ctx: &ResolutionContext<'_>| {
                factory(ctx.scope()).map_err(|e| DependencyError::creation(type_info.full_name, e))
            },
        )
    }

    /// 注册自动装配的作用域服务
    pub fn register_scoped_injectable<T>(&mut self) -> DependencyResult<()>
    where
        T: Injectable,
    {
        self.insert_scoped::<T, _>(
            TypeInfo::of::<T>(),
            |ctx: &ResolutionContext<'_>| construct::<T, _>(ctx).map(Arc::new),
        )
    }

    /// 以接口注册自动装配的作用域服务
    ///
    /// `upcast` 负责把实现转换为接口，通常写作 `|repo| repo as Arc<dyn Repo>`。
    /// 实现构建失败时，[`DependencyError::ServiceCreation`] 报告的是接口类型。
    pub fn register_scoped_as<TService, TImpl, U>(&mut self, upcast: U) -> DependencyResult<()>
    where
        TService: Component + ?Sized,
        TImpl: Injectable,
        U: Fn(Arc<TImpl>) -> Arc<TService> + Send + Sync + 'static,
    {
        let service = TypeInfo::of::<TService>();
        let implementation = TypeInfo::of::<TImpl>();
        self.insert_scoped::<TService, _>(service, move |ctx: &ResolutionContext<'_>| {
            match construct::<TImpl, _>(ctx) {
                Ok(instance) => Ok(upcast(Arc::new(instance))),
                Err(DependencyError::ServiceCreation { type_name, source })
                    if type_name == implementation.full_name =>
                {
                    Err(DependencyError::creation(service.full_name, source))
                }
                Err(e) => Err(e),
            }
        })
    }

    fn insert_scoped<T, F>(&mut self, type_info: TypeInfo, factory: F) -> DependencyResult<()>
    where
        T: Component + ?Sized,
        F: Fn(&ResolutionContext<'_>) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        self.begin_registration(type_info, Lifetime::Scoped)?;
        let factory: ScopedFactoryFn<T> = Arc::new(factory);
        self.scoped_factories
            .insert(type_info.id, ServiceEntry::new(type_info, factory));
        Ok(())
    }

    // ---- 解析 ----

    /// 解析服务
    ///
    /// 依次检查实例、工厂、作用域工厂。作用域服务直接从注册表解析时
    /// 使用根上下文调用工厂，且不会缓存：每次调用都得到新实例。
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
        if self.config.log_resolutions {
            debug!("解析服务: {} (深度 {})", type_info, depth);
        }

        if let Some(entry) = self.instances.get(&type_info.id) {
            return entry.get::<Arc<T>>().map(Arc::clone);
        }

        if let Some(entry) = self.factories.get(&type_info.id) {
            let factory = entry.get::<FactoryFn<T>>()?;
            return factory().map_err(|e| {
                error!("服务创建失败: {} - {}", type_info, e);
                DependencyError::creation(type_info.full_name, e)
            });
        }

        if let Some(entry) = self.scoped_factories.get(&type_info.id) {
            debug!("在根上下文解析作用域服务，结果不会被缓存: {}", type_info);
            let factory = entry.get::<ScopedFactoryFn<T>>()?;
            return factory(&ResolutionContext::root(self, depth));
        }

        Err(DependencyError::not_registered(type_info.full_name))
    }

    /// 取出作用域工厂（供作用域使用）
    pub(crate) fn scoped_factory<T>(&self) -> DependencyResult<Option<ScopedFactoryFn<T>>>
    where
        T: Component + ?Sized,
    {
        self.ensure_not_disposed()?;
        self.scoped_factories
            .get(&TypeId::of::<T>())
            .map(|entry| entry.get::<ScopedFactoryFn<T>>().map(Arc::clone))
            .transpose()
    }

    // ---- 作用域 ----

    /// 创建新的作用域
    pub fn create_scope(&self) -> DependencyResult<ServiceScope<'_>> {
        self.create_named_scope("scope")
    }

    /// 创建带名称的作用域（例如会话 ID）
    pub fn create_named_scope(&self, name: impl Into<String>) -> DependencyResult<ServiceScope<'_>> {
        self.ensure_not_disposed()?;
        let mut scope = ServiceScope::new(self, name.into());
        scope.activate();
        info!("创建作用域: {} ({})", scope.name(), scope.id());
        Ok(scope)
    }

    // ---- 校验与查询 ----

    /// 检查是否已注册（任意生命周期）
    ///
    /// 返回值不携带错误：注册表释放后存储已清空，始终返回 `false`，
    /// 并以 `warn!` 记录这次对已释放注册表的访问。
    pub fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.warn_if_disposed("is_registered", TypeInfo::of::<T>());
        self.lifetimes.contains_key(&TypeId::of::<T>())
    }

    /// 获取服务的生命周期
    ///
    /// 未注册时返回 [`Lifetime::Transient`]，不视为错误。
    /// 注册表释放后同样返回 [`Lifetime::Transient`]，并以 `warn!` 记录。
    pub fn get_service_lifetime<T>(&self) -> Lifetime
    where
        T: ?Sized + 'static,
    {
        self.warn_if_disposed("get_service_lifetime", TypeInfo::of::<T>());
        self.lifetimes
            .get(&TypeId::of::<T>())
            .copied()
            .unwrap_or_default()
    }

    /// 校验给定的服务都已注册，一次列出全部缺失项
    pub fn validate_services(&self, types: &[TypeInfo]) -> DependencyResult<()> {
        self.ensure_not_disposed()?;

        let missing: Vec<String> = types
            .iter()
            .filter(|t| !self.lifetimes.contains_key(&t.id))
            .map(|t| t.full_name.to_string())
            .collect();

        if missing.is_empty() {
            debug!("服务校验通过: {} 个", types.len());
            Ok(())
        } else {
            error!("缺少必需的服务: {:?}", missing);
            Err(DependencyError::MissingServices { missing })
        }
    }

    /// 执行所有单例的健康检查
    pub fn perform_health_checks(&self) -> DependencyResult<HealthReport> {
        self.ensure_not_disposed()?;
        let report = self.health_checks.check_all();
        info!(
            "健康检查完成: {} 项, 整体{}",
            report.results.len(),
            if report.is_healthy { "健康" } else { "不健康" }
        );
        Ok(report)
    }

    /// 统计信息
    pub fn get_statistics(&self) -> DependencyResult<RegistryStats> {
        self.ensure_not_disposed()?;
        Ok(RegistryStats {
            singleton_count: self.instances.len(),
            factory_count: self.factories.len(),
            scoped_count: self.scoped_factories.len(),
            disposable_count: self.disposables.len(),
            health_check_count: self.health_checks.len(),
            registered_types: self.registration_order.clone(),
        })
    }

    // ---- 释放 ----

    /// 释放所有单例并清空存储，注册表本身保持可用
    ///
    /// 释放失败不会中断清理，最终以 [`DependencyError::Disposal`] 汇总返回。
    pub fn clear(&mut self) -> DependencyResult<()> {
        self.ensure_not_disposed()?;
        info!("清空注册表: {} 个服务", self.registration_order.len());
        self.teardown()
    }

    /// 释放注册表
    ///
    /// 按注册顺序释放所有可释放单例，随后清空存储。之后的任何调用都返回
    /// [`DependencyError::ObjectDisposed`]。
    pub fn dispose(&mut self) -> DependencyResult<()> {
        self.ensure_not_disposed()?;
        info!("释放注册表");
        let result = self.teardown();
        self.disposed = true;
        result
    }

    fn teardown(&mut self) -> DependencyResult<()> {
        let result = self.disposables.dispose_all();

        self.instances.clear();
        self.factories.clear();
        self.scoped_factories.clear();
        self.lifetimes.clear();
        self.registration_order.clear();
        self.health_checks.clear();

        result.map_err(DependencyError::from)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ServiceRegistry {
    fn drop(&mut self) {
        if !self.disposed {
            if let Err(e) = self.dispose() {
                error!("注册表释放时出错: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("instances", &self.instances.len())
            .field("factories", &self.factories.len())
            .field("scoped_factories", &self.scoped_factories.len())
            .field("disposables", &self.disposables)
            .field("health_checks", &self.health_checks)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl ServiceResolver for ServiceRegistry {
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
        Self::is_registered::<T>(self)
    }

    fn get_service_lifetime<T>(&self) -> Lifetime
    where
        T: ?Sized + 'static,
    {
        Self::get_service_lifetime::<T>(self)
    }
}
