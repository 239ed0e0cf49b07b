//! One live WebSocket connection

use std::net::SocketAddr;

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use super::router::ServerState;
use crate::protocol::{EventRouter, OutboundEvent};

pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_failed_upgrade(move |err| tracing::debug!(%peer, error = %err, "websocket upgrade failed"))
        .on_upgrade(move |socket| serve(socket, peer, state.events))
}

/// Pump frames until the client goes away.
///
/// Outbound events from the router and from background training share one
/// unbounded channel, drained by a writer task that owns the socket's sink
/// half. When the read side ends the session is disconnected, which cancels
/// its training job.
pub async fn serve(socket: WebSocket, peer: SocketAddr, router: EventRouter) {
    let registry = router.registry().clone();
    let connection = registry.connect();
    let span = tracing::info_span!("connection", %connection, %peer);

    async move {
        tracing::info!("client connected");
        let (mut write, mut read) = socket.split();
        let (sink, mut outbound) = mpsc::unbounded_channel::<OutboundEvent>();

        let writer = tokio::spawn(
            async move {
                while let Some(event) = outbound.recv().await {
                    let text = match event.to_json() {
                        Ok(text) => text,
                        Err(err) => {
                            tracing::error!(error = %err, "failed to encode event");
                            continue;
                        }
                    };
                    if write.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                let _ = write.close().await;
            }
            .in_current_span(),
        );

        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    router.handle_text(connection, text.as_str(), &sink).await;
                }
                Ok(Message::Binary(_)) => {
                    let _ = sink.send(OutboundEvent::Error {
                        message: "expected a text frame".to_string(),
                    });
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "read failed");
                    break;
                }
            }
        }

        registry.disconnect(connection).await;
        // Training tasks may still hold a sender; nobody is listening anymore.
        drop(sink);
        writer.abort();
        tracing::info!("client disconnected");
    }
    .instrument(span)
    .await
}
