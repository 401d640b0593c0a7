//! The streaming pipeline: pump task, handoff channel, stream handle.
//!
//! One [`EventStream`] represents one in-flight streaming call. A
//! dedicated tokio task (the pump) owns the response body, scans it into
//! SSE frames, decodes each frame into `T` and publishes the events onto
//! a bounded channel. The channel is the only backpressure point: a slow
//! consumer directly throttles how fast frames are read off the wire.
//!
//! Events never carry errors — the sequence simply ends, and the reason
//! is read separately from [`EventStream::end`]. On every termination
//! path (end-of-stream, transport failure, decode failure, cancellation)
//! the pump records the status exactly once, closes the channel exactly
//! once, and drops the response body.

use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::ClientError;
use crate::sse::data_frames;

/// Why a stream ended.
///
/// A fault during streaming looks like a shorter-than-expected sequence
/// of events; this status is the only way to tell it apart from a normal
/// completion, so check it (or use [`EventStream::finish`]) after the
/// receive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server closed the response body after the last frame.
    Completed,
    /// The response body failed before a clean end-of-stream.
    Transport { message: String },
    /// A frame could not be decoded; no further frames were processed.
    Decode { frame: String, message: String },
    /// The consumer cancelled or abandoned the stream.
    Cancelled,
}

impl StreamEnd {
    /// Convert into a `Result`, so a faulted stream cannot be mistaken
    /// for a completed one.
    pub fn into_result(self) -> Result<(), ClientError> {
        match self {
            StreamEnd::Completed => Ok(()),
            StreamEnd::Transport { message } => Err(ClientError::Transport(message)),
            StreamEnd::Decode { frame, message } => Err(ClientError::Decode { frame, message }),
            StreamEnd::Cancelled => Err(ClientError::Cancelled),
        }
    }
}

/// Handle to one in-flight streaming call.
///
/// Yields decoded events in wire order, either through [`recv`] or the
/// [`Stream`] impl. Dropping the handle cancels the pump, which stops at
/// its next suspension point and releases the underlying connection.
///
/// [`recv`]: EventStream::recv
pub struct EventStream<T> {
    events: mpsc::Receiver<T>,
    cancel: CancellationToken,
    end: Arc<OnceLock<StreamEnd>>,
}

impl<T> EventStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Spawn a pump over an already-open response body.
    ///
    /// Ownership of `body` moves into the pump task and the body is
    /// dropped there on every termination path, exactly once. The token
    /// is observed at both of the pump's suspension points: waiting for
    /// bytes and waiting for the consumer to accept an event.
    pub fn spawn<S, B, E>(body: S, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let end = Arc::new(OnceLock::new());

        let status = Arc::clone(&end);
        let token = cancel.clone();
        tokio::spawn(async move {
            let frames = data_frames(body);
            let outcome = pump(frames, &tx, &token).await;
            tracing::debug!(?outcome, "stream pump finished");
            // Record the status before the sender drops: a consumer that
            // sees the channel close is guaranteed to find it set.
            let _ = status.set(outcome);
            drop(tx);
        });

        Self {
            events: rx,
            cancel,
            end,
        }
    }
}

impl<T> EventStream<T> {
    /// Receive the next event. `None` means the stream has ended and
    /// [`end`](EventStream::end) is readable.
    pub async fn recv(&mut self) -> Option<T> {
        self.events.recv().await
    }

    /// Request cancellation. The pump stops at its next suspension point;
    /// remaining buffered events may still be received.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Terminal status: `None` while the pump is still running, and a
    /// stable value once the stream has ended — repeated calls return
    /// the same result.
    pub fn end(&self) -> Option<StreamEnd> {
        self.end.get().cloned()
    }

    /// Drain and discard any remaining events, then report how the
    /// stream ended. Awaiting this after the receive loop is the
    /// easiest way not to mistake a faulted stream for a completed one.
    pub async fn finish(mut self) -> Result<(), ClientError> {
        while self.events.recv().await.is_some() {}
        match self.end.get() {
            Some(end) => end.clone().into_result(),
            // Only reachable if the pump task died without reporting.
            None => Err(ClientError::Transport(
                "stream pump terminated without a status".to_string(),
            )),
        }
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().events.poll_recv(cx)
    }
}

impl<T> Drop for EventStream<T> {
    fn drop(&mut self) {
        // An abandoned consumer must not leave the pump blocked on a
        // publish nobody will accept, or waiting on a socket that never
        // closes.
        self.cancel.cancel();
    }
}

/// Drive the scanner and decoder until a terminal condition.
///
/// Invariants: frames are decoded and published strictly in wire order;
/// the first decode failure stops the stream at the offending frame;
/// cancellation wins over pending work at every suspension point.
async fn pump<F, T, E>(frames: F, tx: &mpsc::Sender<T>, cancel: &CancellationToken) -> StreamEnd
where
    F: Stream<Item = Result<String, E>>,
    T: DeserializeOwned,
    E: std::fmt::Display,
{
    let mut frames = std::pin::pin!(frames);
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamEnd::Cancelled,
            next = frames.next() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                return StreamEnd::Transport {
                    message: e.to_string(),
                }
            }
            None => return StreamEnd::Completed,
        };

        let event = match serde_json::from_str::<T>(&frame) {
            Ok(event) => event,
            Err(e) => {
                return StreamEnd::Decode {
                    frame,
                    message: e.to_string(),
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamEnd::Cancelled,
            sent = tx.send(event) => {
                // A dropped receiver is consumer abandonment, handled
                // the same as an explicit cancel.
                if sent.is_err() {
                    return StreamEnd::Cancelled;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_end_maps_to_client_error() {
        assert!(StreamEnd::Completed.into_result().is_ok());
        assert!(matches!(
            StreamEnd::Transport {
                message: "reset".to_string()
            }
            .into_result(),
            Err(ClientError::Transport(_))
        ));
        assert!(matches!(
            StreamEnd::Decode {
                frame: "{".to_string(),
                message: "eof".to_string()
            }
            .into_result(),
            Err(ClientError::Decode { .. })
        ));
        assert!(matches!(
            StreamEnd::Cancelled.into_result(),
            Err(ClientError::Cancelled)
        ));
    }
}
