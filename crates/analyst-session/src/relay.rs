//! Decode-and-republish relay for streamed analyst replies.

use analyst_core::{ByteStream, SseDecoder, UpstreamError, APOLOGY_MESSAGE};
use futures::StreamExt;
use tracing::{debug, warn};

/// What a finished relay produced.
#[derive(Debug, Clone, Default)]
pub struct Relayed {
    /// Concatenated deltas, in arrival order.
    pub content: String,
    /// Number of deltas republished.
    pub deltas: usize,
    /// Error that cut the stream short, if any.
    pub interrupted: Option<UpstreamError>,
}

impl Relayed {
    /// A relay that never started because the request itself failed.
    pub fn failed(error: UpstreamError) -> Self {
        Self {
            interrupted: Some(error),
            ..Default::default()
        }
    }

    /// Text to keep as the assistant reply.
    ///
    /// Content that arrived before a failure stands as the reply. The apology
    /// is used only when the stream failed before producing anything; a
    /// stream that ended cleanly with no content yields `None`.
    pub fn reply(&self) -> Option<String> {
        if !self.content.is_empty() {
            Some(self.content.clone())
        } else if self.interrupted.is_some() {
            Some(APOLOGY_MESSAGE.to_string())
        } else {
            None
        }
    }
}

/// Pull `stream` to completion, handing each content delta to `on_delta`.
///
/// Reads stop at the `[DONE]` terminator, at the end of the body, or at the
/// first read error. Whatever is still buffered gets one final parse.
pub async fn relay_stream<F>(mut stream: ByteStream, mut on_delta: F) -> Relayed
where
    F: FnMut(&str),
{
    let mut decoder = SseDecoder::new();
    let mut relayed = Relayed::default();

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                for delta in decoder.feed(&chunk) {
                    publish(&mut relayed, &delta, &mut on_delta);
                }
                if decoder.is_done() {
                    debug!("Stream terminated after {} deltas", relayed.deltas);
                    break;
                }
            }
            Err(e) => {
                warn!("Reply stream interrupted after {} deltas: {}", relayed.deltas, e);
                relayed.interrupted = Some(e);
                break;
            }
        }
    }

    for delta in decoder.finish() {
        publish(&mut relayed, &delta, &mut on_delta);
    }

    relayed
}

fn publish<F: FnMut(&str)>(relayed: &mut Relayed, delta: &str, on_delta: &mut F) {
    on_delta(delta);
    relayed.content.push_str(delta);
    relayed.deltas += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::sse::{delta_event, done_event};
    use futures::stream;

    fn chunks(parts: Vec<&[u8]>, error: Option<UpstreamError>) -> ByteStream {
        let items: Vec<Result<bytes::Bytes, UpstreamError>> = parts
            .into_iter()
            .map(|part| Ok(bytes::Bytes::copy_from_slice(part)))
            .chain(error.into_iter().map(Err))
            .collect();
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn test_relay_publishes_in_order() {
        let body = format!("{}{}{}", delta_event("MRR "), delta_event("is up"), done_event());
        let mut seen = Vec::new();

        let relayed = relay_stream(chunks(vec![body.as_bytes()], None), |d| {
            seen.push(d.to_string())
        })
        .await;

        assert_eq!(seen, vec!["MRR ", "is up"]);
        assert_eq!(relayed.content, "MRR is up");
        assert_eq!(relayed.deltas, 2);
        assert!(relayed.interrupted.is_none());
        assert_eq!(relayed.reply().as_deref(), Some("MRR is up"));
    }

    #[tokio::test]
    async fn test_chunk_split_inside_payload_yields_one_delta() {
        let body = format!("{}{}", delta_event("Hello"), done_event());
        let cut = body.find("\"choices\"").unwrap() + 4;
        let (a, b) = body.as_bytes().split_at(cut);

        let mut count = 0;
        let relayed = relay_stream(chunks(vec![a, b], None), |_| count += 1).await;

        assert_eq!(count, 1);
        assert_eq!(relayed.content, "Hello");
    }

    #[tokio::test]
    async fn test_partial_content_survives_mid_stream_error() {
        let first = delta_event("Revenue grew");
        let relayed = relay_stream(
            chunks(
                vec![first.as_bytes()],
                Some(UpstreamError::Network("reset".into())),
            ),
            |_| {},
        )
        .await;

        assert!(relayed.interrupted.is_some());
        assert_eq!(relayed.reply().as_deref(), Some("Revenue grew"));
    }

    #[tokio::test]
    async fn test_error_before_content_yields_apology() {
        let relayed = relay_stream(
            chunks(vec![&b": keep-alive\n"[..]], Some(UpstreamError::Network("reset".into()))),
            |_| {},
        )
        .await;

        assert_eq!(relayed.deltas, 0);
        assert_eq!(relayed.reply().as_deref(), Some(APOLOGY_MESSAGE));
        assert_eq!(
            Relayed::failed(UpstreamError::RateLimited).reply().as_deref(),
            Some(APOLOGY_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_clean_empty_stream_has_no_reply() {
        let relayed = relay_stream(chunks(vec![done_event().as_bytes()], None), |_| {}).await;
        assert!(relayed.reply().is_none());
    }

    #[tokio::test]
    async fn test_unterminated_tail_is_flushed() {
        let tail = "data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}";
        let relayed = relay_stream(chunks(vec![tail.as_bytes()], None), |_| {}).await;
        assert_eq!(relayed.content, "tail");
    }
}
