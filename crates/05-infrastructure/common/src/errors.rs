//! 错误类型定义

use thiserror::Error;

/// 由调用方提供的失败原因（工厂、释放钩子、健康检查）
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("服务重复注册: {type_name} (已注册为 {existing})")]
    DuplicateRegistration {
        type_name: String,
        existing: String,
    },

    #[error("服务未注册: {type_name}")]
    ServiceNotRegistered { type_name: String },

    #[error("服务创建失败: {type_name}, 原因: {source}")]
    ServiceCreation { type_name: String, source: BoxError },

    #[error("无法解析依赖 {dependency} (被 {requested_by} 需要)")]
    UnresolvedDependency {
        dependency: String,
        requested_by: String,
    },

    #[error("缺少必需的服务: {}", .missing.join(", "))]
    MissingServices { missing: Vec<String> },

    #[error("对象已释放: {object_name}")]
    ObjectDisposed { object_name: String },

    #[error("解析深度超过上限 {max_depth}: {type_name}")]
    ResolutionDepthExceeded { type_name: String, max_depth: usize },

    #[error("服务类型不匹配: {type_name}")]
    TypeMismatch { type_name: String },

    #[error(transparent)]
    Disposal(#[from] DisposalError),
}

impl DependencyError {
    /// 创建未注册错误
    pub fn not_registered(type_name: impl Into<String>) -> Self {
        Self::ServiceNotRegistered {
            type_name: type_name.into(),
        }
    }

    /// 创建已释放错误
    pub fn disposed(object_name: impl Into<String>) -> Self {
        Self::ObjectDisposed {
            object_name: object_name.into(),
        }
    }

    /// 包装工厂失败
    pub fn creation(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ServiceCreation {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 是否为"未注册"类错误
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::ServiceNotRegistered { .. })
    }
}

/// 单个释放失败
#[derive(Error, Debug)]
#[error("{service}: {source}")]
pub struct DisposalFailure {
    /// 失败的服务类型名称
    pub service: String,
    /// 释放钩子返回的错误
    pub source: BoxError,
}

/// 释放过程中收集到的全部失败
///
/// 释放总是完整扫描所有被跟踪的实例，失败只会被收集，不会中断扫描。
#[derive(Error, Debug)]
#[error("{} 个服务释放失败: {}", .failures.len(), summary(.failures))]
pub struct DisposalError {
    /// 按释放顺序排列的失败列表
    pub failures: Vec<DisposalFailure>,
}

fn summary(failures: &[DisposalFailure]) -> String {
    failures
        .iter()
        .map(|f| f.service.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DisposalError {
    /// 失败的服务名称列表
    pub fn failed_services(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.service.as_str()).collect()
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type DisposalResult = Result<(), DisposalError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
