use crate::error::{Result, TaskboardError};
use crate::watch::client::ChangeStream;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A message pushed by the file-change notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeMessage {
    /// Handshake sent once per connection
    Connected,
    Add {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Change {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Unlink {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

impl ChangeMessage {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Whether the message means cached task data is stale.
    ///
    /// Additions, changes and removals are treated alike.
    pub fn is_invalidation(&self) -> bool {
        !matches!(self, Self::Connected)
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Connected => None,
            Self::Add { path } | Self::Change { path } | Self::Unlink { path } => path.as_deref(),
        }
    }
}

/// Longest line accepted from the change stream
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Fails the stream once a single line grows past `max_line` bytes.
///
/// The event decoder buffers until a line ending arrives, so a peer that
/// never sends one is cut off here instead.
pub fn limit_line_length(stream: ChangeStream, max_line: usize) -> ChangeStream {
    let mut pending = 0usize;

    stream
        .map(move |chunk| {
            let chunk = chunk?;
            match chunk.iter().rposition(|&b| matches!(b, b'\n' | b'\r')) {
                Some(end) => pending = chunk.len() - end - 1,
                None => pending += chunk.len(),
            }

            if pending > max_line {
                warn!(pending, max_line, "dropping oversized change stream frame");
                return Err(TaskboardError::StreamError(format!(
                    "line exceeds {} bytes",
                    max_line
                )));
            }
            Ok(chunk)
        })
        .boxed()
}
