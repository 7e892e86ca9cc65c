//! Client for the file-change notification channel.
//!
//! The channel pushes one message per file event. The client collapses bursts
//! of them into a single invalidation and keeps the subscription alive with
//! exponential backoff.

pub mod client;
pub mod debounce;
pub mod message;
pub mod reconnect;

pub use client::{ChangeHandler, ChangeSource, ChangeStream, WatchClient, WatchHandle};
pub use debounce::Debouncer;
pub use message::{limit_line_length, ChangeMessage, MAX_LINE_BYTES};
pub use reconnect::ReconnectPolicy;
