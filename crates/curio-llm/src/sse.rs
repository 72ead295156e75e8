use std::collections::VecDeque;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::backend::DeltaStream;
use crate::error::Result;

/// Line buffer for SSE bodies. Uses VecDeque so complete lines can be
/// drained from the front while partial tails stay buffered.
pub(crate) struct LineBuffer {
    buffer: VecDeque<u8>,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line, trimmed. Returns None until a
    /// newline arrives. Lines that are not valid UTF-8 are dropped.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
            let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

            match std::str::from_utf8(&line_bytes) {
                Ok(line) => return Some(line.trim().to_string()),
                Err(e) => {
                    tracing::debug!("dropping non-UTF-8 stream line: {}", e);
                    continue;
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

impl StreamChunk {
    fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}

/// Decode a line-delimited `data: <json>` response body into content
/// fragments. The stream ends at the `data: [DONE]` sentinel. Malformed
/// events are skipped without aborting the stream.
pub fn delta_stream<S>(bytes: S) -> DeltaStream
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = LineBuffer::with_capacity(8192);

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(chunk) => {
                    buffer.extend(&chunk);

                    while let Some(line) = buffer.next_line() {
                        if line.is_empty() {
                            continue;
                        }

                        let Some(data) = line.strip_prefix("data: ") else {
                            continue;
                        };

                        if data == "[DONE]" {
                            break 'read;
                        }

                        match serde_json::from_str::<StreamChunk>(data) {
                            Ok(event) => {
                                if let Some(content) = event.content() {
                                    if !content.is_empty() {
                                        yield Ok(content.to_string());
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::debug!("skipping malformed stream event: {}", e);
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break 'read;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn collect(chunks: Vec<&'static [u8]>) -> Vec<String> {
        let items: Vec<Result<Bytes>> = chunks
            .into_iter()
            .map(|c| Ok(Bytes::from_static(c)))
            .collect();
        let mut deltas = Vec::new();
        let mut stream = delta_stream(stream::iter(items));
        while let Some(item) = stream.next().await {
            deltas.push(item.unwrap());
        }
        deltas
    }

    #[tokio::test]
    async fn test_parses_events_split_across_chunks() {
        let deltas = collect(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"delt",
            b"a\":{\"content\":\"lo\"}}]}\n",
            b"data: [DONE]\n",
        ])
        .await;

        assert_eq!(deltas, vec!["Hel".to_string(), "lo".to_string()]);
    }

    #[tokio::test]
    async fn test_done_sentinel_ends_stream() {
        let deltas = collect(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\ndata: [DONE]\ndata: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n",
        ])
        .await;

        assert_eq!(deltas, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_events_are_skipped() {
        let deltas = collect(vec![
            b"data: {not valid json}\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\ndata: [DONE]\n",
        ])
        .await;

        assert_eq!(deltas, vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn test_finish_chunk_without_content_yields_nothing() {
        let deltas = collect(vec![
            b"data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\ndata: [DONE]\n",
        ])
        .await;

        assert!(deltas.is_empty());
    }

    #[test]
    fn test_line_buffer_partial_lines() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"partial");
        assert!(buffer.next_line().is_none());

        buffer.extend(b" line\n");
        assert_eq!(buffer.next_line().unwrap(), "partial line");
    }
}
