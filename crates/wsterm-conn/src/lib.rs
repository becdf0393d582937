//! # wsterm-conn
//!
//! リモートシェルへの全二重接続のライフサイクル状態機械。
//!
//! ## 状態遷移
//!
//! ```text
//! Idle ──connect()──▶ Connecting ──on_open──▶ Open
//!                        │                     │
//!                        │ on_close / 生成失敗  │ on_close
//!                        ▼                     ▼
//!                     Closed(Network) ◀────────┘
//!                        │
//!                        ├─ 再試行可 ──(backoff 後 on_retry_timer)──▶ Connecting
//!                        └─ 上限到達 ──▶ Closed(Network)（Exhausted を 1 回だけ通知）
//!
//! close() ──▶ Closed(UserInitiated)（再試行なし、保留中のタイマーもキャンセル）
//! ```
//!
//! ## エポック
//!
//! `connect()` のたびにエポックを 1 進め、トランスポートとタイマーの
//! コールバックにはその時点のエポックを付ける。現在のエポックと一致しない
//! コールバックは古い接続からのものとして無視する。
//!
//! I/O はすべて [`Connector`] / [`Transport`] / [`Scheduler`] の実装側
//! （`wsterm-wasm` クレート）が担当する。このクレートは状態だけを持つ。

#![no_std]
extern crate alloc;

pub mod error;
pub mod machine;
pub mod policy;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::TransportError;
pub use machine::{
    CloseReason, ConnectionEvent, ConnectionMachine, ConnectionState, ConnectionStats, Delivery,
};
pub use policy::ReconnectPolicy;
pub use transport::{Connector, Epoch, Scheduler, Transport};

/// 再接続の最大試行回数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// 最初の再接続までの待ち時間（ミリ秒）
pub const DEFAULT_BASE_DELAY_MS: u32 = 2000;

/// 待ち時間の上限（ミリ秒）
pub const DEFAULT_MAX_DELAY_MS: u32 = 30_000;

/// 試行ごとに待ち時間に掛ける倍率
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;
