//! Line-delimited streaming response decoder.
//!
//! The streaming endpoint writes one `data: <json>` line per fragment and
//! finishes with a `[DONE]` sentinel line. Every line decodes independently;
//! a line that fails to decode is salvaged verbatim as fragment content
//! rather than dropped or turned into an error.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, Stream, StreamExt};

use crate::errors::ChatError;
use crate::types::{ChatChunk, Choice, Delta};

/// Stream terminator. A line containing it anywhere ends the stream.
const DONE_SENTINEL: &str = "[DONE]";

// ─── Frame Decoder ───────────────────────────────────────────────────────────

/// Decoded form of one line of the streaming body.
#[derive(Debug, Clone)]
pub enum StreamFrame {
    /// A fragment carrying deltas.
    Chunk(ChatChunk),
    /// End of the stream: sentinel line or blank line.
    Done,
}

/// Decode a single line of the streaming body.
///
/// Rules, in order:
/// - a blank line or a line containing `[DONE]` anywhere ends the stream;
/// - otherwise the `data:` prefix is stripped and the remainder parsed as a
///   [`ChatChunk`];
/// - a line that does not parse becomes a fallback chunk whose first delta
///   carries the raw line as content, so a drifting upstream degrades to
///   visible text instead of lost output.
///
/// A returned chunk always has at least one choice; when a parsed chunk
/// arrives with an empty choice list (some endpoints do this on their final
/// usage-bearing fragment) an empty-delta choice is synthesized.
pub fn decode_frame(line: &str) -> StreamFrame {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.contains(DONE_SENTINEL) {
        return StreamFrame::Done;
    }

    let payload = trimmed
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    match serde_json::from_str::<ChatChunk>(payload) {
        Ok(mut chunk) => {
            if chunk.choices.is_empty() {
                chunk.choices.push(Choice {
                    index: Some(0),
                    delta: Some(Delta::default()),
                    ..Choice::default()
                });
            }
            StreamFrame::Chunk(chunk)
        }
        Err(e) => {
            tracing::warn!(reason = %e, "unparseable stream line, salvaging as content");
            StreamFrame::Chunk(salvage_chunk(line))
        }
    }
}

/// Build the fallback chunk for text that never parsed: the raw text becomes
/// the delta content so nothing the endpoint sent is silently dropped.
fn salvage_chunk(text: &str) -> ChatChunk {
    ChatChunk {
        choices: vec![Choice {
            index: Some(0),
            delta: Some(Delta {
                content: Some(text.to_string()),
                ..Delta::default()
            }),
            ..Choice::default()
        }],
        ..ChatChunk::default()
    }
}

// ─── ChatStream ──────────────────────────────────────────────────────────────

/// Live fragment sequence for one streaming request.
///
/// Yields one [`ChatChunk`] per upstream `data:` line until the `[DONE]`
/// sentinel or the end of the body. The sequence is lazy, advancing only when
/// pulled, and cannot be restarted: once it has ended it stays ended. A read
/// failure on the underlying body surfaces once as [`ChatError::Transport`],
/// after which the stream is over. Decode failures never surface as errors;
/// they are salvaged by [`decode_frame`].
pub struct ChatStream {
    inner: Pin<Box<dyn Stream<Item = Result<ChatChunk, ChatError>> + Send>>,
}

impl ChatStream {
    /// Wrap a live streaming HTTP response body.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        let endpoint = response.url().to_string();
        let byte_stream = response
            .bytes_stream()
            .map(|item| item.map(|bytes| bytes.to_vec()).map_err(|e| e.to_string()));
        Self::from_byte_results(byte_stream, endpoint)
    }

    /// A one-fragment stream carrying `text` as delta content. Stands in for
    /// a live stream when the request itself failed, so reading code has a
    /// single path regardless of outcome.
    pub fn fallback(text: impl Into<String>) -> Self {
        let chunk = salvage_chunk(&text.into());
        let once = stream::once(async move { Ok::<ChatChunk, ChatError>(chunk) });
        Self {
            inner: Box::pin(once),
        }
    }

    /// Drive a byte source through the line decoder.
    ///
    /// The buffer holds raw bytes; conversion to text happens per complete
    /// line, so a multi-byte character split across reads stays intact.
    fn from_byte_results<S>(source: S, endpoint: String) -> Self
    where
        S: Stream<Item = Result<Vec<u8>, String>> + Send + 'static,
    {
        let source = Box::pin(source);
        let lines = stream::unfold(
            (source, Vec::new(), false, endpoint),
            |(mut source, mut buffer, mut done, endpoint)| async move {
                loop {
                    if done {
                        return None;
                    }

                    // Drain one complete line from the buffer, if any.
                    if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let mut line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
                        line_bytes.pop();
                        if line_bytes.last() == Some(&b'\r') {
                            line_bytes.pop();
                        }
                        let line = String::from_utf8_lossy(&line_bytes);
                        // Blank lines between frames are separators.
                        if line.trim().is_empty() {
                            continue;
                        }
                        match decode_frame(&line) {
                            StreamFrame::Chunk(chunk) => {
                                return Some((Ok(chunk), (source, buffer, done, endpoint)));
                            }
                            StreamFrame::Done => return None,
                        }
                    }

                    match source.next().await {
                        Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                        Some(Err(reason)) => {
                            done = true;
                            return Some((
                                Err(ChatError::Transport {
                                    endpoint: endpoint.clone(),
                                    reason,
                                }),
                                (source, buffer, done, endpoint),
                            ));
                        }
                        None => {
                            // Body ended without a sentinel; flush any final
                            // unterminated line.
                            done = true;
                            let mut tail = std::mem::take(&mut buffer);
                            if tail.last() == Some(&b'\r') {
                                tail.pop();
                            }
                            let line = String::from_utf8_lossy(&tail);
                            if line.trim().is_empty() {
                                return None;
                            }
                            match decode_frame(&line) {
                                StreamFrame::Chunk(chunk) => {
                                    return Some((Ok(chunk), (source, buffer, done, endpoint)));
                                }
                                StreamFrame::Done => return None,
                            }
                        }
                    }
                }
            },
        );

        Self {
            inner: Box::pin(lines.fuse()),
        }
    }

    /// Pull the next fragment.
    ///
    /// `None` means the stream is over and will stay over.
    pub async fn next_chunk(&mut self) -> Option<Result<ChatChunk, ChatError>> {
        self.inner.next().await
    }
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream").finish_non_exhaustive()
    }
}

impl Stream for ChatStream {
    type Item = Result<ChatChunk, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
