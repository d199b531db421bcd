//! 可释放实例跟踪

use infrastructure_common::{
    BoxError, Component, DisposalError, DisposalFailure, DisposalResult, TypeInfo,
};
use std::sync::Arc;
use tracing::{debug, error};

type DisposeHook = Box<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

struct TrackedDisposable {
    service: TypeInfo,
    /// 实例数据指针，用于去重
    address: usize,
    hook: DisposeHook,
}

/// 可释放实例跟踪器
///
/// 按跟踪顺序释放；同一个实例即使以多个服务类型注册也只释放一次。
#[derive(Default)]
pub struct DisposalTracker {
    entries: Vec<TrackedDisposable>,
}

impl std::fmt::Debug for DisposalTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposalTracker")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl DisposalTracker {
    /// 创建空的跟踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 如果实例具备释放能力则开始跟踪，返回是否新增了跟踪
    pub fn track<T>(&mut self, service: TypeInfo, instance: &Arc<T>) -> bool
    where
        T: Component + ?Sized,
    {
        if instance.as_disposable().is_none() {
            return false;
        }

        let address = Arc::as_ptr(instance).cast::<()>() as usize;
        if self.entries.iter().any(|e| e.address == address) {
            debug!("实例已被跟踪，跳过: {}", service);
            return false;
        }

        let instance = Arc::clone(instance);
        self.entries.push(TrackedDisposable {
            service,
            address,
            hook: Box::new(move || {
                instance
                    .as_disposable()
                    .map_or(Ok(()), |disposable| disposable.dispose())
            }),
        });
        true
    }

    /// 已跟踪的实例数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 释放全部实例并清空跟踪列表
    ///
    /// 每个实例都会被尝试释放一次；失败会被记录并汇总返回。
    pub fn dispose_all(&mut self) -> DisposalResult {
        let mut failures = Vec::new();

        for entry in self.entries.drain(..) {
            debug!("释放服务: {}", entry.service);
            if let Err(e) = (entry.hook)() {
                error!("服务释放失败: {} - {}", entry.service, e);
                failures.push(DisposalFailure {
                    service: entry.service.full_name.to_string(),
                    source: e,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DisposalError { failures })
        }
    }
}
