//! 服务安装器

use di_impl::ServiceRegistry;
use infrastructure_common::{DependencyResult, TypeInfo};

/// 服务安装器
///
/// 插件通过安装器向注册表登记自己的服务。约定的注册顺序是：
/// 配置、无依赖的服务、有依赖的服务、共享单例。注册表不强制这个顺序。
pub trait ServiceInstaller {
    /// 安装器名称，用于日志
    fn name(&self) -> &str;

    /// 向注册表登记服务
    fn install(&self, registry: &mut ServiceRegistry) -> DependencyResult<()>;

    /// 安装完成后必须存在的服务
    fn required_services(&self) -> Vec<TypeInfo> {
        Vec::new()
    }
}
