//! 注册表构建器

use crate::installer::ServiceInstaller;
use di_abstractions::ContainerConfig;
use di_impl::ServiceRegistry;
use infrastructure_common::{InfrastructureError, TypeInfo};
use std::path::Path;
use tracing::{debug, error, info};

/// 注册表构建器
///
/// 使用建造者模式组装注册表：加载配置、按顺序执行安装器，
/// 最后一次性校验所有必需的服务。
pub struct RegistryBuilder {
    /// 容器配置
    config: ContainerConfig,
    /// 安装器列表，按添加顺序执行
    installers: Vec<Box<dyn ServiceInstaller>>,
    /// 额外声明的必需服务
    required: Vec<TypeInfo>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl RegistryBuilder {
    /// 创建新的注册表构建器
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            installers: Vec::new(),
            required: Vec::new(),
            logging_enabled: false, // 默认不初始化日志
            logging_config: LoggingConfig::default(),
        }
    }

    /// 使用指定的容器配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 从配置文件和 `DI__*` 环境变量加载容器配置
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        info!("加载容器配置文件: {}", path.display());
        self.config = ContainerConfig::load(path)?;
        Ok(self)
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 启用或禁用构建后的服务校验
    pub fn enable_validation(mut self, enabled: bool) -> Self {
        self.config.validate_on_build = enabled;
        self
    }

    /// 添加服务安装器
    pub fn add_installer<T: ServiceInstaller + 'static>(mut self, installer: T) -> Self {
        debug!("添加服务安装器: {}", installer.name());
        self.installers.push(Box::new(installer));
        self
    }

    /// 声明构建完成后必须存在的服务
    pub fn require<T: ?Sized + 'static>(mut self) -> Self {
        self.required.push(TypeInfo::of::<T>());
        self
    }

    /// 构建注册表
    pub fn build(self) -> Result<ServiceRegistry, InfrastructureError> {
        info!("开始构建服务注册表");

        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.logging_config.init();
        }

        self.config.validate()?;

        let mut registry = ServiceRegistry::with_config(self.config.clone());
        let mut required = self.required;

        for installer in &self.installers {
            info!("执行服务安装器: {}", installer.name());
            if let Err(e) = installer.install(&mut registry) {
                error!("服务安装器 {} 失败: {}", installer.name(), e);
                return Err(e.into());
            }
            required.extend(installer.required_services());
        }

        if self.config.validate_on_build {
            info!("校验必需的服务: {} 个", required.len());
            registry.validate_services(&required)?;
        } else {
            debug!("跳过服务校验");
        }

        info!(
            "服务注册表构建完成: {} 个安装器",
            self.installers.len()
        );
        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 安装全局日志订阅者
    ///
    /// 已经安装过订阅者时保留原有的，返回 `false`。
    pub fn init(&self) -> bool {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };

        match result {
            Ok(()) => {
                info!("日志系统初始化完成");
                true
            }
            Err(e) => {
                debug!("日志系统已初始化，沿用现有订阅者: {}", e);
                false
            }
        }
    }
}
