//! 再接続タイマー（gloo-timers）

use gloo_timers::callback::Timeout;

use wsterm_conn::{Epoch, Scheduler};

use crate::client::{with_session, WeakSession};

/// `setTimeout` で再接続を予約するスケジューラー
///
/// ハンドルは [`Timeout`] そのもの。キャンセルまたは drop で `clearTimeout` される。
pub struct TimeoutScheduler {
    session: WeakSession,
}

impl TimeoutScheduler {
    pub fn new(session: WeakSession) -> Self {
        TimeoutScheduler { session }
    }
}

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn schedule(&mut self, delay_ms: u32, epoch: Epoch) -> Timeout {
        let session = self.session.clone();
        Timeout::new(delay_ms, move || {
            with_session(&session, |s| s.on_retry_timer(epoch));
        })
    }

    fn cancel(&mut self, handle: Timeout) {
        let _ = handle.cancel();
    }
}
