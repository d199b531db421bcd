//! # 基础设施组合层
//!
//! 负责把各个插件的服务组合进一个服务注册表。
//!
//! ## 主要功能
//!
//! - **注册表构建器**: 使用构建者模式加载配置、执行安装器并校验必需服务
//! - **服务安装器**: 插件登记服务的统一入口
//! - **日志初始化**: 开发/生产两种预设
//!
//! ## 基本使用
//!
//! ```rust
//! use di_impl::ServiceRegistry;
//! use infrastructure_common::{Component, DependencyResult, TypeInfo};
//! use infrastructure_composition::{RegistryBuilder, ServiceInstaller};
//!
//! struct Clock;
//! impl Component for Clock {}
//!
//! struct CoreInstaller;
//!
//! impl ServiceInstaller for CoreInstaller {
//!     fn name(&self) -> &str {
//!         "core"
//!     }
//!
//!     fn install(&self, registry: &mut ServiceRegistry) -> DependencyResult<()> {
//!         registry.register_instance(Clock)
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .add_installer(CoreInstaller)
//!     .require::<Clock>()
//!     .build()?;
//!
//! assert!(registry.is_registered::<Clock>());
//! # Ok::<(), infrastructure_common::InfrastructureError>(())
//! ```

pub mod builder;
pub mod installer;

pub use builder::{LoggingConfig, RegistryBuilder};
pub use installer::ServiceInstaller;

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
