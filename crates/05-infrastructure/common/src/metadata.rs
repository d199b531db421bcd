//! 元数据定义
//!
//! 提供服务类型的元数据信息

use std::any::TypeId;
use std::fmt;

/// 类型信息
///
/// 相等性与哈希只依赖 [`TypeId`]，名称仅用于日志和错误信息。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（含模块路径）
    pub full_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.full_name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name)
    }
}

/// 去掉模块路径，泛型参数保持原样
///
/// `"dyn a::b::Logger"` -> `"Logger"`，`"a::Wrapper<b::Inner>"` -> `"Wrapper<b::Inner>"`
pub fn short_type_name(full_name: &'static str) -> &'static str {
    let base = full_name.split('<').next().unwrap_or(full_name);
    base.rfind("::")
        .map_or(full_name, |idx| &full_name[idx + 2..])
}
