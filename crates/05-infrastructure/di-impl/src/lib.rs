//! # 依赖注入具体实现
//!
//! 提供服务注册表、服务作用域以及自动装配所需的解析上下文。
//!
//! ## 生命周期
//!
//! - 单例：注册时提供实例，之后每次解析返回同一个实例
//! - 瞬时：注册工厂，每次解析都调用工厂
//! - 作用域：同一作用域内只创建一次；直接从注册表解析时每次都是新实例
//!
//! ## 示例
//!
//! ```
//! use di_impl::ServiceRegistry;
//! use infrastructure_common::Component;
//! use std::sync::Arc;
//!
//! trait Greeter: Component {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Component for English {}
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register_singleton::<dyn Greeter>(Arc::new(English)).unwrap();
//!
//! let greeter = registry.get_service::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

pub mod context;
pub mod disposal;
mod registration;
pub mod registry;
pub mod scope;

pub use context::ResolutionContext;
pub use disposal::DisposalTracker;
pub use registry::ServiceRegistry;
pub use scope::ServiceScope;
