//! 健康检查相关接口定义

use crate::errors::BoxError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// 健康状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "data")]
pub enum HealthStatus {
    /// 健康状态
    Healthy,
    /// 降级状态
    Degraded {
        message: String,
        details: Option<HashMap<String, String>>,
    },
    /// 不健康状态
    Unhealthy {
        error: String,
        details: Option<HashMap<String, String>>,
    },
}

impl HealthStatus {
    /// 创建健康状态
    pub fn healthy() -> Self {
        Self::Healthy
    }

    /// 创建降级状态
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::Degraded {
            message: message.into(),
            details: None,
        }
    }

    /// 创建不健康状态
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self::Unhealthy {
            error: error.into(),
            details: None,
        }
    }

    /// 创建不健康状态（带详情）
    pub fn unhealthy_with_details(
        error: impl Into<String>,
        details: HashMap<String, String>,
    ) -> Self {
        Self::Unhealthy {
            error: error.into(),
            details: Some(details),
        }
    }

    /// 检查是否健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 检查是否降级
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// 检查是否不健康
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy { .. })
    }

    /// 状态附带的消息
    pub fn message(&self) -> &str {
        match self {
            Self::Healthy => "OK",
            Self::Degraded { message, .. } => message.as_str(),
            Self::Unhealthy { error, .. } => error.as_str(),
        }
    }
}

/// 健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// 组件名称
    pub component_name: String,
    /// 健康状态
    pub status: HealthStatus,
    /// 是否健康（降级视为健康）
    pub healthy: bool,
    /// 状态消息
    pub message: String,
    /// 检查耗时
    pub duration: Duration,
    /// 检查时间
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// 创建新的健康检查结果
    pub fn new(component_name: impl Into<String>, status: HealthStatus, duration: Duration) -> Self {
        Self {
            component_name: component_name.into(),
            healthy: !status.is_unhealthy(),
            message: status.message().to_string(),
            status,
            duration,
            checked_at: chrono::Utc::now(),
        }
    }
}

/// 健康检查能力
pub trait HealthCheckable: Send + Sync {
    /// 执行健康检查
    ///
    /// 返回 `Err` 等价于不健康，错误信息会进入报告。
    fn check_health(&self) -> Result<HealthStatus, BoxError>;

    /// 是否启用健康检查
    fn is_enabled(&self) -> bool {
        true
    }
}

/// 聚合后的健康报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// 每个实例的检查结果，按注册顺序
    pub results: Vec<HealthCheckResult>,
    /// 所有实例都健康时为 true
    pub is_healthy: bool,
    /// 报告生成时间
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    /// 由检查结果构建报告
    pub fn from_results(results: Vec<HealthCheckResult>) -> Self {
        Self {
            is_healthy: results.iter().all(|r| r.healthy),
            results,
            generated_at: chrono::Utc::now(),
        }
    }

    /// 不健康的结果
    pub fn unhealthy(&self) -> impl Iterator<Item = &HealthCheckResult> {
        self.results.iter().filter(|r| !r.healthy)
    }

    /// 按组件名称查找结果
    pub fn get(&self, component_name: &str) -> Option<&HealthCheckResult> {
        self.results
            .iter()
            .find(|r| r.component_name == component_name)
    }

    /// 整体健康状态
    pub fn overall_status(&self) -> HealthStatus {
        let unhealthy: HashMap<String, String> = self
            .unhealthy()
            .map(|r| (r.component_name.clone(), r.message.clone()))
            .collect();

        if !unhealthy.is_empty() {
            HealthStatus::unhealthy_with_details(
                format!("{}个组件不健康", unhealthy.len()),
                unhealthy,
            )
        } else if self.results.iter().any(|r| r.status.is_degraded()) {
            HealthStatus::degraded("部分组件降级")
        } else {
            HealthStatus::healthy()
        }
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

type HealthProbe = Box<dyn Fn() -> Option<Result<HealthStatus, BoxError>> + Send + Sync>;

struct RegisteredCheck {
    component_name: String,
    probe: HealthProbe,
}

/// 聚合健康检查器
///
/// 探针返回 `None` 表示该实例当前禁用了健康检查，不进入报告。
#[derive(Default)]
pub struct AggregateHealthChecker {
    checkers: Vec<RegisteredCheck>,
}

impl std::fmt::Debug for AggregateHealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateHealthChecker")
            .field("checkers", &format!("{} checkers", self.checkers.len()))
            .finish()
    }
}

impl AggregateHealthChecker {
    /// 创建新的聚合健康检查器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加健康检查探针
    pub fn add_checker<F>(&mut self, component_name: impl Into<String>, probe: F)
    where
        F: Fn() -> Option<Result<HealthStatus, BoxError>> + Send + Sync + 'static,
    {
        self.checkers.push(RegisteredCheck {
            component_name: component_name.into(),
            probe: Box::new(probe),
        });
    }

    /// 已跟踪的检查器数量
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// 是否没有任何检查器
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// 移除所有检查器
    pub fn clear(&mut self) {
        self.checkers.clear();
    }

    /// 执行所有健康检查
    ///
    /// 单个检查失败只会记录为不健康，不影响其余检查。
    pub fn check_all(&self) -> HealthReport {
        let mut results = Vec::with_capacity(self.checkers.len());

        for checker in &self.checkers {
            let start = Instant::now();
            let status = match (checker.probe)() {
                None => continue,
                Some(Ok(status)) => status,
                Some(Err(e)) => {
                    warn!("健康检查失败: {} - {}", checker.component_name, e);
                    HealthStatus::unhealthy(e.to_string())
                }
            };

            results.push(HealthCheckResult::new(
                checker.component_name.clone(),
                status,
                start.elapsed(),
            ));
        }

        HealthReport::from_results(results)
    }
}
