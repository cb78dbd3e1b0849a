use crate::bridge::{StreamToken, TokenReceiver};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;

/// Frames every token as one `data:` event; the last event is always `[DONE]`.
pub fn event_stream(
    tokens: TokenReceiver,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let events = tokens
        .into_stream()
        .map(|token| Ok::<_, Infallible>(event_for(token)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn event_for(token: StreamToken) -> Event {
    // Event data may span lines but must not contain carriage returns.
    let payload = token.into_payload().replace("\r\n", "\n").replace('\r', "\n");
    Event::default().data(payload)
}
