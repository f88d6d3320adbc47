//! 串行化的共享调度器
//!
//! 命令循环和周期性的空闲淘汰可能运行在不同的上下文 (任务或线程)。
//! 所有入口都要先拿到同一把异步锁，一条命令处理完之前
//! 淘汰检查只能等待，从而维持“最多一个打开句柄”的约束。
//! 等待方让出执行权而不是关中断自旋，存储操作再慢也不会拖住中断。

use crate::command::{Dispatcher, TransferOptions};
use crate::fs::Volume;
use crate::transfer::{Responder, TransferResult, WireCodec};
use crate::util::Clock;

use super::primitives::{new_mutex, CriticalMutex};

/// 共享调度器
pub struct SharedDispatcher<V: Volume, C: Clock, K: WireCodec> {
    inner: CriticalMutex<Dispatcher<V, C, K>>,
}

impl<V: Volume, C: Clock, K: WireCodec> SharedDispatcher<V, C, K> {
    pub const fn new(dispatcher: Dispatcher<V, C, K>) -> Self {
        Self {
            inner: new_mutex(dispatcher),
        }
    }

    /// 处理一条命令
    pub async fn dispatch<R: Responder + ?Sized>(&self, command: &str, responder: &mut R) -> TransferResult {
        self.inner.lock().await.dispatch(command, responder)
    }

    /// 空闲淘汰检查
    pub async fn tick(&self) -> bool {
        self.inner.lock().await.tick()
    }

    /// 修改权限
    pub async fn set_options(&self, options: TransferOptions) {
        self.inner.lock().await.set_options(options);
    }

    pub async fn options(&self) -> TransferOptions {
        self.inner.lock().await.options()
    }

    /// 在锁内访问调度器
    pub async fn with<R>(&self, f: impl FnOnce(&mut Dispatcher<V, C, K>) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    pub fn into_inner(self) -> Dispatcher<V, C, K> {
        self.inner.into_inner()
    }
}
