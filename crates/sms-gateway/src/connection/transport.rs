//! Socket pumps
//!
//! One reader and one writer task per upgraded socket. When either exits the
//! connection is unregistered and the other task is stopped.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use sms_common::ConnectionConfig;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant};

use super::{Connection, ConnectionId, ConnectionState, Frame, TransportError};
use crate::hub::HubHandle;

/// Serve an upgraded observer socket until it closes
pub async fn serve_socket(mut socket: WebSocket, hub: HubHandle, config: ConnectionConfig) {
    let (handle, queue) = hub.new_connection();
    let mut connection = Connection::track(&handle);
    let id = connection.id();

    if let Err(e) = hub.register(handle).await {
        tracing::warn!(connection_id = %id, error = %e, "Failed to register connection");
        connection.transition(ConnectionState::Closed);
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    connection.transition(ConnectionState::Registered);
    tracing::info!(connection_id = %id, "WebSocket connection established");

    let (sink, stream) = socket.split();
    run_pumps(&mut connection, sink, stream, queue, &hub, &config).await;
}

/// Run both pumps of a registered connection and unregister it when either exits
pub(crate) async fn run_pumps<S, R>(
    connection: &mut Connection,
    sink: S,
    stream: R,
    queue: mpsc::Receiver<Frame>,
    hub: &HubHandle,
    config: &ConnectionConfig,
) where
    S: Sink<Message, Error = axum::Error> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    let id = connection.id();
    let mut writer = tokio::spawn(write_pump(id, sink, queue, config.clone()));
    let mut reader = tokio::spawn(read_pump(id, stream, hub.clone(), config.pong_wait()));

    tokio::select! {
        result = &mut reader => {
            log_exit(id, "Reader", result);
            connection.transition(ConnectionState::Draining);
            unregister(hub, id).await;

            // Closing the queue lets the writer send its Close frame
            match timeout(config.write_wait(), &mut writer).await {
                Ok(result) => log_exit(id, "Writer", result),
                Err(_) => writer.abort(),
            }
        }
        result = &mut writer => {
            log_exit(id, "Writer", result);
            connection.transition(ConnectionState::Draining);
            reader.abort();
            unregister(hub, id).await;
        }
    }

    connection.transition(ConnectionState::Closed);
    tracing::info!(connection_id = %id, "Connection closed");
}

async fn unregister(hub: &HubHandle, id: ConnectionId) {
    if let Err(e) = hub.unregister(id).await {
        tracing::debug!(connection_id = %id, error = %e, "Unregister skipped");
    }
}

fn log_exit(
    id: ConnectionId,
    task: &'static str,
    result: Result<Result<(), TransportError>, tokio::task::JoinError>,
) {
    match result {
        Ok(Ok(())) => tracing::debug!(connection_id = %id, task, "Task finished"),
        Ok(Err(e)) if e.is_timeout() => {
            tracing::info!(connection_id = %id, task, error = %e, "Connection timed out");
        }
        Ok(Err(e)) => tracing::warn!(connection_id = %id, task, error = %e, "Transport error"),
        Err(e) => tracing::debug!(connection_id = %id, task, error = %e, "Task stopped"),
    }
}

/// Drain the outbound queue to the socket in FIFO order
///
/// Pings every `ping_period`; each write must finish within `write_wait`.
/// A closed queue results in a Close frame.
pub(crate) async fn write_pump<S>(
    id: ConnectionId,
    mut sink: S,
    mut queue: mpsc::Receiver<Frame>,
    config: ConnectionConfig,
) -> Result<(), TransportError>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let write_wait = config.write_wait();
    let ping_period = config.ping_period();
    let mut ping = interval_at(Instant::now() + ping_period, ping_period);

    loop {
        tokio::select! {
            frame = queue.recv() => match frame {
                Some(frame) => {
                    write_frame(&mut sink, Message::Text(frame.to_string()), write_wait).await?;
                }
                None => {
                    tracing::debug!(connection_id = %id, "Queue closed, sending Close");
                    let _ = write_frame(&mut sink, Message::Close(None), write_wait).await;
                    return Ok(());
                }
            },
            _ = ping.tick() => {
                tracing::trace!(connection_id = %id, "Ping");
                write_frame(&mut sink, Message::Ping(Vec::new()), write_wait).await?;
            }
        }
    }
}

async fn write_frame<S>(sink: &mut S, message: Message, wait: Duration) -> Result<(), TransportError>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    match timeout(wait, sink.send(message)).await {
        Ok(result) => result.map_err(TransportError::from),
        Err(_) => Err(TransportError::WriteTimeout(wait)),
    }
}

/// Hand inbound text frames to the hub until the peer goes away
///
/// Every frame, pongs included, must arrive within `pong_wait`.
pub(crate) async fn read_pump<R>(
    id: ConnectionId,
    mut stream: R,
    hub: HubHandle,
    pong_wait: Duration,
) -> Result<(), TransportError>
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let next = timeout(pong_wait, stream.next())
            .await
            .map_err(|_| TransportError::ReadTimeout(pong_wait))?;

        match next {
            Some(Ok(Message::Text(text))) => hub.receive(&text),
            Some(Ok(Message::Binary(_))) => {
                return Err(TransportError::Encoding("binary frames are not supported"));
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                tracing::trace!(connection_id = %id, "Liveness frame received");
            }
            Some(Ok(Message::Close(_))) => {
                tracing::info!(connection_id = %id, "Client closed connection");
                return Ok(());
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(()),
        }
    }
}
