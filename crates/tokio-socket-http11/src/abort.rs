//! リクエストの中断

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct AbortInner {
    aborted: AtomicBool,
    notify: Notify,
}

/// 実行中のリクエストを中断するハンドル
///
/// 複製しても同じリクエストを指す。何度呼んでも中断は一度だけ起きる。
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    inner: Arc<AbortInner>,
}

impl AbortHandle {
    /// 新しいハンドルを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 中断する
    ///
    /// 最初の呼び出しのときだけ `true` を返す。
    pub fn abort(&self) -> bool {
        let first = !self.inner.aborted.swap(true, Ordering::AcqRel);
        if first {
            tracing::debug!("request aborted");
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// 中断済みか
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// 中断されるまで待つ
    pub async fn aborted(&self) {
        // notified() は作成時点で登録されるので、フラグ確認との間の通知も取りこぼさない
        let notified = self.inner.notify.notified();
        if self.is_aborted() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_abort_twice() {
        let handle = AbortHandle::new();
        assert!(!handle.is_aborted());
        assert!(handle.abort());
        assert!(!handle.abort());
        assert!(handle.is_aborted());
    }

    #[tokio::test]
    async fn test_aborted_wakes_waiter() {
        let handle = AbortHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.aborted().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.abort();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_aborted_returns_immediately_after_abort() {
        let handle = AbortHandle::new();
        handle.abort();
        tokio::time::timeout(Duration::from_millis(100), handle.aborted())
            .await
            .unwrap();
    }
}
