//! 容器配置与统计

use infrastructure_common::{ConfigError, ConfigResult, TypeInfo};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 环境变量前缀，例如 `DI__MAX_RESOLUTION_DEPTH=16`
pub const ENV_PREFIX: &str = "DI";

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 自动装配的最大解析深度
    pub max_resolution_depth: usize,
    /// 构建完成后是否校验必需服务
    pub validate_on_build: bool,
    /// 是否以 debug 级别记录每次解析
    pub log_resolutions: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 64,
            validate_on_build: true,
            log_resolutions: false,
        }
    }
}

impl ContainerConfig {
    /// 从配置文件和环境变量加载
    ///
    /// 优先级：环境变量 > 配置文件 > 默认值。文件不存在时忽略。
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("加载容器配置: {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                error!("容器配置构建失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;

        Self::bind(settings)
    }

    /// 仅从环境变量加载
    pub fn from_env() -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;

        Self::bind(settings)
    }

    fn bind(settings: config::Config) -> ConfigResult<Self> {
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

/// 注册表统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// 单例实例数量
    pub singleton_count: usize,
    /// 工厂（瞬时）数量
    pub factory_count: usize,
    /// 作用域工厂数量
    pub scoped_count: usize,
    /// 被跟踪的可释放实例数量
    pub disposable_count: usize,
    /// 被跟踪的健康检查数量
    pub health_check_count: usize,
    /// 所有已注册类型，按注册顺序
    pub registered_types: Vec<TypeInfo>,
}

impl RegistryStats {
    /// 注册总数
    pub fn total(&self) -> usize {
        self.singleton_count + self.factory_count + self.scoped_count
    }
}
