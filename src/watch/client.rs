use crate::config::WatchSettings;
use crate::error::{Result, TaskboardError};
use crate::watch::debounce::Debouncer;
use crate::watch::message::{limit_line_length, ChangeMessage, MAX_LINE_BYTES};
use async_trait::async_trait;
use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Raw byte chunks of a server-sent event stream
pub type ChangeStream = BoxStream<'static, Result<Bytes>>;

/// Opens connections to the file-change notification channel
#[async_trait]
pub trait ChangeSource: Send + Sync {
    async fn connect(&self) -> Result<ChangeStream>;
}

/// Receives debounced change notifications
#[async_trait]
pub trait ChangeHandler: Send + Sync {
    /// Called once per debounced burst with every mutation it contained
    async fn on_invalidate(&self, changes: Vec<ChangeMessage>);

    /// Called when the server acknowledges a new connection
    async fn on_connected(&self) {}
}

#[async_trait]
impl<T: ChangeHandler + ?Sized> ChangeHandler for Arc<T> {
    async fn on_invalidate(&self, changes: Vec<ChangeMessage>) {
        (**self).on_invalidate(changes).await
    }

    async fn on_connected(&self) {
        (**self).on_connected().await
    }
}

enum StreamEnd {
    Cancelled,
    Closed,
    Failed(TaskboardError),
}

/// Subscribes to file-change notifications and turns bursts of them into
/// single invalidations, reconnecting with backoff when the stream drops.
pub struct WatchClient<S> {
    source: S,
    settings: WatchSettings,
    cancel: CancellationToken,
}

impl<S: ChangeSource> WatchClient<S> {
    pub fn new(source: S, settings: WatchSettings) -> Self {
        Self {
            source,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the client when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs until cancelled or until reconnect attempts are used up.
    ///
    /// The attempt counter resets whenever a connection is established.
    pub async fn run<H: ChangeHandler>(&self, handler: &H) -> Result<()> {
        let mut attempt: u32 = 0;

        loop {
            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                result = self.source.connect() => result,
            };

            match connected {
                Ok(stream) => {
                    info!("change stream connected");
                    attempt = 0;
                    match self.consume(stream, handler).await {
                        StreamEnd::Cancelled => return Ok(()),
                        StreamEnd::Closed => info!("change stream closed by server"),
                        StreamEnd::Failed(err) => warn!(error = %err, "change stream failed"),
                    }
                }
                Err(err) => warn!(error = %err, attempt, "failed to connect change stream"),
            }

            attempt += 1;
            let Some(delay) = self.settings.reconnect.delay_for(attempt) else {
                error!(attempts = attempt - 1, "giving up on change stream");
                return Err(TaskboardError::StreamError(format!(
                    "gave up after {} reconnect attempts",
                    attempt - 1
                )));
            };

            debug!(attempt, ?delay, "reconnecting change stream");
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn consume<H: ChangeHandler>(&self, stream: ChangeStream, handler: &H) -> StreamEnd {
        let mut events = limit_line_length(stream, MAX_LINE_BYTES).eventsource();
        let mut debouncer = Debouncer::new(self.settings.debounce());
        let mut batch: Vec<ChangeMessage> = Vec::new();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debouncer.cancel();
                    return StreamEnd::Cancelled;
                }
                coalesced = debouncer.fired() => {
                    debug!(coalesced, "invalidating after change burst");
                    handler.on_invalidate(std::mem::take(&mut batch)).await;
                }
                event = events.next() => match event {
                    Some(Ok(event)) => match ChangeMessage::parse(&event.data) {
                        Ok(message) if message.is_invalidation() => {
                            debug!(path = ?message.path(), "file change received");
                            batch.push(message);
                            debouncer.trigger();
                        }
                        Ok(_) => handler.on_connected().await,
                        Err(err) => warn!(error = %err, data = %event.data, "skipping malformed change message"),
                    },
                    Some(Err(err)) => {
                        Self::flush(&mut debouncer, &mut batch, handler).await;
                        let err = match err {
                            EventStreamError::Transport(err) => err,
                            other => TaskboardError::StreamError(other.to_string()),
                        };
                        return StreamEnd::Failed(err);
                    }
                    None => {
                        Self::flush(&mut debouncer, &mut batch, handler).await;
                        return StreamEnd::Closed;
                    }
                }
            }
        }
    }

    /// Delivers a pending burst immediately instead of waiting out the timer
    async fn flush<H: ChangeHandler>(
        debouncer: &mut Debouncer,
        batch: &mut Vec<ChangeMessage>,
        handler: &H,
    ) {
        if debouncer.is_pending() {
            debouncer.cancel();
            handler.on_invalidate(std::mem::take(batch)).await;
        }
    }
}

impl<S: ChangeSource + 'static> WatchClient<S> {
    /// Runs the client on a background task
    pub fn spawn<H: ChangeHandler + 'static>(self, handler: H) -> WatchHandle {
        let cancel = self.cancel.clone();
        let join = tokio::spawn(async move { self.run(&handler).await });
        WatchHandle { cancel, join }
    }
}

/// Handle to a spawned [`WatchClient`]
pub struct WatchHandle {
    cancel: CancellationToken,
    join: JoinHandle<Result<()>>,
}

impl WatchHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancels pending timers, closes the stream and waits for the task
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.join
            .await
            .map_err(|e| TaskboardError::Other(format!("watch task failed: {}", e)))?
    }
}
