//! Shared SSE streaming infrastructure for the HTTP clients.
//!
//! Both clients follow the same pattern: receive a `reqwest::Response`,
//! buffer chunks, split on `\n\n`, extract `data:` payloads, and feed each
//! payload to a provider-specific parser that returns `Vec<Result<StreamEvent>>`.
//!
//! - [`drain_data_lines`] -- pull complete `data:` payloads from an SSE buffer
//! - [`sse_response_stream`] -- build a `BoxStream` from a response + parser closure
//! - [`collect_tokens`] -- drive a stream into a sink and return the full text

use crate::util::from_reqwest;
use futures_util::StreamExt;
use sd_domain::error::{Error, Result};
use sd_domain::stream::{BoxStream, ChunkSink, StreamEvent};

/// Extract complete `data:` payloads from an SSE buffer.
///
/// SSE events are delimited by `\n\n`. Each event block may contain
/// `event:`, `data:`, `id:`, or `retry:` lines; only `data:` lines are kept.
///
/// The buffer is drained in-place: consumed bytes are removed and any
/// trailing partial event remains for the next call.
pub(crate) fn drain_data_lines(buffer: &mut String) -> Vec<String> {
    let mut data_lines = Vec::new();

    // Some servers use CRLF framing.
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }

    while let Some(pos) = buffer.find("\n\n") {
        let block: String = buffer.drain(..pos).collect();
        buffer.drain(..2);

        for line in block.lines() {
            let line = line.trim();
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    data_lines.push(data.to_string());
                }
            }
        }
    }

    data_lines
}

/// Decode the longest valid UTF-8 prefix of `pending`, leaving an
/// incomplete trailing sequence in place for the next chunk.
///
/// Invalid bytes in the middle of the buffer are replaced with U+FFFD.
pub(crate) fn decode_utf8_prefix(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut consumed = 0;

    loop {
        match std::str::from_utf8(&pending[consumed..]) {
            Ok(valid) => {
                text.push_str(valid);
                consumed = pending.len();
                break;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&pending[consumed..consumed + valid]));
                consumed += valid;
                match e.error_len() {
                    Some(bad) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        consumed += bad;
                    }
                    // Input ended mid-character.
                    None => break,
                }
            }
        }
    }

    pending.drain(..consumed);
    text
}

/// Build a [`BoxStream`] from an SSE `reqwest::Response` and a
/// provider-specific parser closure.
///
/// The stream:
/// 1. Buffers incoming bytes, decodes only complete UTF-8 sequences, and
///    drains complete SSE events
/// 2. Flushes the remaining buffer when the response body closes
/// 3. Emits a closing `Done` event if the parser never produced one
pub(crate) fn sse_response_stream<F>(
    response: reqwest::Response,
    mut parse_data: F,
) -> BoxStream<'static, Result<StreamEvent>>
where
    F: FnMut(&str) -> Vec<Result<StreamEvent>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut response = response;
        let mut pending: Vec<u8> = Vec::new();
        let mut buffer = String::new();
        let mut done_emitted = false;

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    pending.extend_from_slice(&bytes);
                    buffer.push_str(&decode_utf8_prefix(&mut pending));

                    for data in drain_data_lines(&mut buffer) {
                        for event in parse_data(&data) {
                            if matches!(&event, Ok(StreamEvent::Done { .. })) {
                                done_emitted = true;
                            }
                            yield event;
                        }
                    }
                }
                Ok(None) => {
                    buffer.push_str(&String::from_utf8_lossy(&pending));
                    if !buffer.trim().is_empty() {
                        buffer.push_str("\n\n");
                        for data in drain_data_lines(&mut buffer) {
                            for event in parse_data(&data) {
                                if matches!(&event, Ok(StreamEvent::Done { .. })) {
                                    done_emitted = true;
                                }
                                yield event;
                            }
                        }
                    }
                    break;
                }
                Err(e) => {
                    yield Err(from_reqwest(e));
                    break;
                }
            }
        }

        if !done_emitted {
            yield Ok(StreamEvent::Done {
                usage: None,
                finish_reason: Some("stop".into()),
            });
        }
    };

    Box::pin(stream)
}

/// Drain a token stream, forwarding every token to `sink` in order, and
/// return the concatenated text.
///
/// Stops at the first `Done`. An `Error` event or a failed item aborts
/// with an error; tokens already forwarded stay delivered.
pub(crate) async fn collect_tokens(
    mut stream: BoxStream<'static, Result<StreamEvent>>,
    sink: Option<&dyn ChunkSink>,
) -> Result<String> {
    let mut text = String::new();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Token { text: token } => {
                if let Some(sink) = sink {
                    sink.on_chunk(&token);
                }
                text.push_str(&token);
            }
            StreamEvent::Done { .. } => break,
            StreamEvent::Error { message } => {
                return Err(Error::Provider {
                    provider: "stream".into(),
                    message,
                });
            }
        }
    }

    Ok(text)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn drain_single_complete_event() {
        let mut buf = String::from("event: message\ndata: {\"hello\":\"world\"}\n\n");
        let lines = drain_data_lines(&mut buf);
        assert_eq!(lines, vec!["{\"hello\":\"world\"}"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_partial_event_stays_in_buffer() {
        let mut buf = String::from("data: complete\n\ndata: partial");
        let lines = drain_data_lines(&mut buf);
        assert_eq!(lines, vec!["complete"]);
        assert_eq!(buf, "data: partial");
    }

    #[test]
    fn drain_ignores_non_data_lines() {
        let mut buf = String::from("event: ping\nid: 42\nretry: 5000\ndata: payload\n\n");
        let lines = drain_data_lines(&mut buf);
        assert_eq!(lines, vec!["payload"]);
    }

    #[test]
    fn drain_handles_crlf_framing() {
        let mut buf = String::from("data: one\r\n\r\ndata: two\r\n\r\n");
        let lines = drain_data_lines(&mut buf);
        assert_eq!(lines, vec!["one", "two"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_incremental_buffering() {
        let mut buf = String::from("data: chunk1");
        assert!(drain_data_lines(&mut buf).is_empty());

        buf.push_str("\n\ndata: chunk2\n\n");
        let lines = drain_data_lines(&mut buf);
        assert_eq!(lines, vec!["chunk1", "chunk2"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_holds_split_multibyte_char() {
        let mut pending = b"data: caf\xC3".to_vec();
        assert_eq!(decode_utf8_prefix(&mut pending), "data: caf");
        assert_eq!(pending, vec![0xC3]);

        pending.extend_from_slice(b"\xA9\n\n");
        assert_eq!(decode_utf8_prefix(&mut pending), "é\n\n");
        assert!(pending.is_empty());
    }

    #[test]
    fn decode_replaces_invalid_bytes() {
        let mut pending = b"ok\xFFok".to_vec();
        assert_eq!(decode_utf8_prefix(&mut pending), "ok\u{FFFD}ok");
        assert!(pending.is_empty());

        let mut pending = b"\xFFcaf\xC3".to_vec();
        assert_eq!(decode_utf8_prefix(&mut pending), "\u{FFFD}caf");
        assert_eq!(pending, vec![0xC3]);
    }

    fn events(items: Vec<Result<StreamEvent>>) -> BoxStream<'static, Result<StreamEvent>> {
        Box::pin(futures_util::stream::iter(items))
    }

    fn token(t: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::Token { text: t.into() })
    }

    #[tokio::test]
    async fn collect_forwards_tokens_in_order() {
        let seen = Mutex::new(Vec::<String>::new());
        let sink = |t: &str| seen.lock().unwrap().push(t.to_string());
        let stream = events(vec![
            token("Reset "),
            token("the "),
            token("password."),
            Ok(StreamEvent::Done {
                usage: None,
                finish_reason: Some("stop".into()),
            }),
            token("ignored"),
        ]);

        let text = collect_tokens(stream, Some(&sink)).await.unwrap();
        assert_eq!(text, "Reset the password.");
        assert_eq!(seen.lock().unwrap().concat(), text);
    }

    #[tokio::test]
    async fn collect_surfaces_stream_errors() {
        let stream = events(vec![
            token("partial"),
            Ok(StreamEvent::Error {
                message: "connection reset".into(),
            }),
        ]);
        let err = collect_tokens(stream, None).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
