//! SSE bridge over the change bus
//!
//! Each connected session gets its own [`Subscription`]; the stream ends
//! when the subscription does (bus gone, or overflow under a disconnect
//! policy) and the browser's `EventSource` reconnects and resyncs. Slow
//! sessions run with drop-oldest: subscribers merge idempotently by
//! sequence number, so skipping a lost prefix is safe.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use shared::models::Role;

use crate::api::actor::CurrentActor;
use crate::bus::{OverflowPolicy, Subscription};
use crate::core::ServerState;

/// GET /api/events/catalog - the full catalog feed, any session
pub async fn catalog_stream(
    State(state): State<ServerState>,
    CurrentActor(_actor): CurrentActor,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.bus.subscribe_catalog(OverflowPolicy::DropOldest);
    Sse::new(subscription_stream(subscription)).keep_alive(KeepAlive::default())
}

/// GET /api/events/orders - admins unfiltered, customers their own orders
pub async fn orders_stream(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = match actor.role {
        Role::Admin => state.bus.subscribe_orders_all(OverflowPolicy::DropOldest),
        Role::Customer => state
            .bus
            .subscribe_orders(&actor.id, OverflowPolicy::DropOldest),
    };
    Sse::new(subscription_stream(subscription)).keep_alive(KeepAlive::default())
}

fn subscription_stream(
    subscription: Subscription,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(subscription, |mut subscription| async move {
        loop {
            match subscription.recv().await {
                Ok(change) => {
                    match Event::default()
                        .event(change.topic().to_string())
                        .id(change.sequence.to_string())
                        .json_data(&change)
                    {
                        Ok(event) => return Some((Ok(event), subscription)),
                        Err(err) => {
                            tracing::error!(%err, "failed to encode change event");
                        }
                    }
                }
                // Subscription ended; close the stream and let the client
                // resubscribe.
                Err(err) => {
                    tracing::debug!(%err, "event stream closed");
                    return None;
                }
            }
        }
    })
}
