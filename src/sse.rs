//! Server-Sent Events frame scanning.
//!
//! The streaming endpoints answer with newline-delimited SSE frames:
//!
//! ```text
//! data: {"event": "message", "answer": "Hel"}
//!
//! data: {"event": "message", "answer": "lo"}
//! ```
//!
//! Only `data: ` lines carry a payload; blank keep-alive lines and other
//! SSE fields are protocol noise and are dropped without error. There is
//! no `[DONE]` sentinel — a stream ends when the server closes the body.

use futures::stream::{self, Stream, StreamExt};

/// Payload lines start with exactly these six bytes.
const DATA_PREFIX: &[u8] = b"data: ";

#[derive(PartialEq)]
enum SourceState {
    Open,
    Ended,
    Failed,
}

/// Convert a stream of raw byte chunks into a stream of frame payloads.
///
/// Yields the text after the `data: ` prefix for each payload line, in
/// wire order; an empty remainder is still a frame. Chunk boundaries may
/// fall anywhere, including inside a multi-byte character. The stream
/// ends when the source is exhausted; if the source fails, the error is
/// yielded once and the stream ends, so callers can tell a clean
/// end-of-stream from a read failure.
pub fn data_frames<S, B, E>(source: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    stream::unfold(
        (Box::pin(source), Vec::new(), SourceState::Open),
        |(mut source, mut buffer, mut state)| async move {
            loop {
                // Drain complete lines already buffered.
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    if let Some(frame) = extract_frame(&line[..pos]) {
                        return Some((Ok(frame), (source, buffer, state)));
                    }
                }

                match state {
                    SourceState::Open => match source.next().await {
                        Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                        Some(Err(e)) => {
                            state = SourceState::Failed;
                            return Some((Err(e), (source, buffer, state)));
                        }
                        None => state = SourceState::Ended,
                    },
                    SourceState::Ended => {
                        // A final line may arrive without a terminator.
                        let rest = std::mem::take(&mut buffer);
                        let frame = extract_frame(&rest)?;
                        return Some((Ok(frame), (source, buffer, state)));
                    }
                    // A partial line buffered when the read failed is
                    // dropped, not flushed: it may be truncated mid-frame.
                    SourceState::Failed => return None,
                }
            }
        },
    )
}

/// Strip the line terminator and the `data: ` prefix. `None` means the
/// line carries no payload and is to be discarded.
fn extract_frame(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line.strip_prefix(DATA_PREFIX)
        .map(|payload| String::from_utf8_lossy(payload).into_owned())
}
