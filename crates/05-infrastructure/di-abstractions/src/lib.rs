//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义服务解析和自动装配的核心接口。
//!
//! ## 核心接口
//!
//! - [`ServiceResolver`] - 服务解析接口（注册表与作用域共同实现）
//! - [`Injectable`] - 编译期声明依赖的自动装配接口
//! - [`Dependencies`] - 依赖元组
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod factory;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use resolver::*;
