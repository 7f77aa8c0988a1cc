use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::Event;
use futures::stream::{self, Stream};
use tracing::error;

/// Characters per SSE frame.
pub const CHUNK_SIZE: usize = 5;

/// Pause between consecutive frames.
pub const FRAME_DELAY: Duration = Duration::from_millis(50);

/// Splits `text` into consecutive slices of at most `size` characters.
///
/// Slicing counts Unicode scalar values, so multibyte text is never cut
/// mid-codepoint.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<char>>()
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Lazily yields `text` as JSON-encoded SSE frames of [`CHUNK_SIZE`]
/// characters, pausing [`FRAME_DELAY`] between frames.
///
/// Dropping the stream cancels it, pending delay included, which is what
/// happens when the client disconnects mid-stream.
pub fn answer_frames(text: String) -> impl Stream<Item = Result<Event, Infallible>> {
    let chunks = chunk_text(&text, CHUNK_SIZE);

    stream::unfold(
        (chunks.into_iter(), false),
        |(mut chunks, delay)| async move {
            let chunk = chunks.next()?;
            if delay {
                tokio::time::sleep(FRAME_DELAY).await;
            }

            let event = match serde_json::to_string(&chunk) {
                Ok(data) => Event::default().data(data),
                Err(e) => {
                    error!("Error while streaming response: {}", e);
                    // One error frame, then the stream ends.
                    chunks = Vec::new().into_iter();
                    let msg = format!("处理响应时出错: {}", e);
                    Event::default().data(serde_json::Value::String(msg).to_string())
                }
            };

            Some((Ok(event), (chunks, true)))
        },
    )
}
