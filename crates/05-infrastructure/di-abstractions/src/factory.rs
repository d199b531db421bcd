//! 服务工厂抽象接口
//!
//! 自动装配不依赖反射：实现 [`Injectable`] 的类型在编译期通过
//! [`Injectable::Dependencies`] 声明构造所需的全部依赖。

use crate::resolver::ServiceResolver;
use infrastructure_common::{BoxError, Component, DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;

/// 零参数工厂
pub type FactoryFn<T> = Arc<dyn Fn() -> Result<Arc<T>, BoxError> + Send + Sync>;

/// 可注入服务 trait
///
/// ```rust
/// use di_abstractions::Injectable;
/// use infrastructure_common::Component;
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// trait Connection: Component {}
///
/// struct Repo {
///     connection: Arc<dyn Connection>,
/// }
///
/// impl Component for Repo {}
///
/// impl Injectable for Repo {
///     type Dependencies = (Arc<dyn Connection>,);
///     type Error = Infallible;
///
///     fn inject((connection,): Self::Dependencies) -> Result<Self, Self::Error> {
///         Ok(Self { connection })
///     }
/// }
/// ```
pub trait Injectable: Component + Sized {
    /// 构造所需的依赖，按参数顺序排列的元组
    type Dependencies: Dependencies;

    /// 构建错误类型
    type Error: std::error::Error + Send + Sync + 'static;

    /// 使用已解析的依赖构建实例
    fn inject(deps: Self::Dependencies) -> Result<Self, Self::Error>;
}

/// 单个依赖
pub trait Dependency: Sized {
    /// 依赖的服务类型
    fn type_info() -> TypeInfo;

    /// 是否必须存在
    fn is_required() -> bool {
        true
    }

    /// 从解析器中取得依赖
    fn resolve_from<R: ServiceResolver>(
        resolver: &R,
        requested_by: TypeInfo,
    ) -> DependencyResult<Self>;
}

impl<T> Dependency for Arc<T>
where
    T: Component + ?Sized,
{
    fn type_info() -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn resolve_from<R: ServiceResolver>(
        resolver: &R,
        requested_by: TypeInfo,
    ) -> DependencyResult<Self> {
        let dependency = TypeInfo::of::<T>();
        resolver.get_service::<T>().map_err(|e| match e {
            DependencyError::ServiceNotRegistered { type_name }
                if type_name == dependency.full_name =>
            {
                DependencyError::UnresolvedDependency {
                    dependency: type_name,
                    requested_by: requested_by.full_name.to_string(),
                }
            }
            other => other,
        })
    }
}

/// 可选依赖：未注册时为 `None`，其余错误照常传播
impl<T> Dependency for Option<Arc<T>>
where
    T: Component + ?Sized,
{
    fn type_info() -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn is_required() -> bool {
        false
    }

    fn resolve_from<R: ServiceResolver>(
        resolver: &R,
        _requested_by: TypeInfo,
    ) -> DependencyResult<Self> {
        if !resolver.is_registered::<T>() {
            return Ok(None);
        }
        resolver.get_service::<T>().map(Some)
    }
}

/// 依赖列表
pub trait Dependencies: Sized {
    /// 声明的依赖类型，按参数顺序
    fn dependency_types() -> Vec<TypeInfo>;

    /// 依次解析所有依赖，遇到第一个失败即返回
    fn resolve_all<R: ServiceResolver>(
        resolver: &R,
        requested_by: TypeInfo,
    ) -> DependencyResult<Self>;
}

impl Dependencies for () {
    fn dependency_types() -> Vec<TypeInfo> {
        Vec::new()
    }

    fn resolve_all<R: ServiceResolver>(
        _resolver: &R,
        _requested_by: TypeInfo,
    ) -> DependencyResult<Self> {
        Ok(())
    }
}

macro_rules! impl_dependencies {
    ($($dep:ident),+) => {
        impl<$($dep: Dependency),+> Dependencies for ($($dep,)+) {
            fn dependency_types() -> Vec<TypeInfo> {
                vec![$($dep::type_info()),+]
            }

            fn resolve_all<R: ServiceResolver>(
                resolver: &R,
                requested_by: TypeInfo,
            ) -> DependencyResult<Self> {
                Ok(($($dep::resolve_from(resolver, requested_by)?,)+))
            }
        }
    };
}

impl_dependencies!(A);
impl_dependencies!(A, B);
impl_dependencies!(A, B, C);
impl_dependencies!(A, B, C, D);
impl_dependencies!(A, B, C, D, E);
impl_dependencies!(A, B, C, D, E, F);
impl_dependencies!(A, B, C, D, E, F, G);
impl_dependencies!(A, B, C, D, E, F, G, H);

/// 通过解析器构建 [`Injectable`] 实例
///
/// 依赖解析错误原样返回；`inject` 失败包装为 [`DependencyError::ServiceCreation`]。
pub fn construct<T, R>(resolver: &R) -> DependencyResult<T>
where
    T: Injectable,
    R: ServiceResolver,
{
    let target = TypeInfo::of::<T>();
    let deps = T::Dependencies::resolve_all(resolver, target)?;
    T::inject(deps).map_err(|e| DependencyError::creation(target.full_name, e))
}
