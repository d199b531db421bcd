//! # Infrastructure Common
//!
//! 这个 crate 提供了服务注册运行时的公共 traits 和类型。
//!
//! ## 核心组件
//!
//! - [`Component`] - 可注册服务的基础 trait（带能力探测）
//! - [`Disposable`] - 资源释放能力
//! - [`HealthCheckable`] - 健康检查能力
//! - [`AggregateHealthChecker`] - 健康检查聚合
//! - [`Lifetime`] - 服务生命周期
//! - [`DependencyError`] - 依赖注入错误分类
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 同步执行，无挂起点
//! - 能力在注册时探测，而不是在使用时

pub mod component;
pub mod errors;
pub mod health;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use health::*;
pub use lifecycle::*;
pub use metadata::*;
