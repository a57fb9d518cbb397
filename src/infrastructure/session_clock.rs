//! 会话计时器 - 基础设施层
//!
//! 在独立的 tokio 任务中倒计时，到期时触发一次回调

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// 时长超出 `Instant` 可表示范围时使用的截止时间（约 30 年后）
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// 可取消的倒计时
///
/// 职责：
/// - 到期回调与取消二者只有一个生效（compare_exchange 决定）
/// - 到期之后再取消是空操作
/// - 以 `tick` 为粒度轮询，取消后最多延迟一个 tick 退出
pub struct SessionClock {
    state: Arc<AtomicU8>,
    handle: JoinHandle<()>,
}

impl SessionClock {
    /// 启动计时器，必须在 tokio 运行时内调用
    pub fn start<F>(duration: Duration, tick: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(ARMED));
        let task_state = Arc::clone(&state);
        let now = Instant::now();
        let deadline = now
            .checked_add(duration)
            .unwrap_or_else(|| now + FAR_FUTURE);

        let handle = tokio::spawn(async move {
            loop {
                if task_state.load(Ordering::Acquire) == CANCELLED {
                    debug!("计时器已取消，轮询结束");
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                sleep(tick.min(deadline - now)).await;
            }

            if task_state
                .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                debug!("⏰ 计时器到期");
                on_expire();
            }
        });

        Self { state, handle }
    }

    /// 取消计时器，返回是否由本次调用完成取消
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// 轮询任务是否已经退出
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
