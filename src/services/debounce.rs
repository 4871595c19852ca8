//! 尾沿防抖
//!
//! 窗口内多次调用只执行最后一次，且只在窗口内没有新调用之后执行。

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

type BoxedAction<T> = Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// 当前登记的调度：序号 + 取消令牌
#[derive(Default)]
struct Pending {
    seq: u64,
    token: Option<CancellationToken>,
}

/// 防抖包装器
///
/// 每次 `call` 都会取消尚未触发的上一次调度；已经开始执行的动作不受影响。
pub struct Debouncer<T> {
    delay: Duration,
    action: BoxedAction<T>,
    pending: Arc<Mutex<Pending>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: BoxedAction<T> = Arc::new(
            move |args| -> Pin<Box<dyn Future<Output = ()> + Send>> { Box::pin(action(args)) },
        );
        Self {
            delay,
            action,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 调度一次执行，覆盖之前尚未触发的调度
    pub fn call(&self, args: T) {
        let token = CancellationToken::new();
        let seq = match self.pending.lock() {
            Ok(mut pending) => {
                if let Some(previous) = pending.token.replace(token.clone()) {
                    previous.cancel();
                }
                pending.seq += 1;
                pending.seq
            }
            Err(_) => return,
        };

        let delay = self.delay;
        let action = self.action.clone();
        let pending = self.pending.clone();

        tokio::spawn(async move {
            // 同时就绪时取消优先
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // 触发时注销自己，之后的 call 不会再取消正在执行的动作
                    if let Ok(mut slot) = pending.lock() {
                        if slot.seq == seq {
                            slot.token = None;
                        }
                    }
                    action(args).await;
                }
            }
        });
    }

    /// 取消尚未触发的调度
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(token) = pending.token.take() {
                token.cancel();
            }
        }
    }

    /// 是否有尚未触发的调度
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.token.is_some())
            .unwrap_or(false)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(token) = pending.token.take() {
                token.cancel();
            }
        }
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
