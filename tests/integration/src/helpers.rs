//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests and
//! connecting observer WebSockets.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use sms_common::AppConfig;
use sms_core::Envelope;
use sms_gateway::server::HealthResponse;
use sms_gateway::{create_gateway_state, run_server, GatewayState};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for something that should arrive
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait for something that should not arrive
pub const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: GatewayState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config on an ephemeral port
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let state = create_gateway_state(config).await?;

        let server_state = state.clone();
        let handle = tokio::spawn(async move {
            run_server(listener, server_state).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the observer WebSocket URL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request with a raw body
    pub async fn post_raw(&self, path: &str, body: impl Into<reqwest::Body>) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?)
    }

    /// Current number of observers as reported by /health
    pub async fn connections(&self) -> Result<usize> {
        let health: HealthResponse = assert_json(self.get("/health").await?, StatusCode::OK).await?;
        Ok(health.connections)
    }

    /// Poll /health until the hub reports `expected` observers
    pub async fn wait_for_connections(&self, expected: usize) -> Result<()> {
        let deadline = tokio::time::Instant::now() + RECEIVE_TIMEOUT;
        loop {
            let current = self.connections().await?;
            if current == expected {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!("Expected {expected} connections, hub reports {current}");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Connect an observer and wait until the hub has registered it
    pub async fn observer(&self) -> Result<Observer> {
        let before = self.connections().await?;
        let observer = Observer::connect(&self.ws_url()).await?;
        self.wait_for_connections(before + 1).await?;
        Ok(observer)
    }
}

/// Observer WebSocket client
pub struct Observer {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Observer {
    /// Connect to a gateway's observer endpoint
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _response) = connect_async(url).await.context("WebSocket connect")?;
        Ok(Self { socket })
    }

    /// Send an envelope as a text frame
    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        self.socket.send(Message::Text(envelope.to_json()?)).await?;
        Ok(())
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.socket.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Next envelope within `wait`, skipping liveness frames
    ///
    /// Returns `None` on timeout or when the server closes the socket.
    pub async fn next_envelope_within(&mut self, wait: Duration) -> Result<Option<Envelope>> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let frame = match tokio::time::timeout_at(deadline, self.socket.next()).await {
                Ok(frame) => frame,
                Err(_) => return Ok(None),
            };

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(Some(Envelope::from_json(&text)?)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Next envelope, failing if none arrives in time
    pub async fn next_envelope(&mut self) -> Result<Envelope> {
        self.next_envelope_within(RECEIVE_TIMEOUT)
            .await?
            .context("No envelope received")
    }

    /// Assert nothing is broadcast for a short while
    pub async fn expect_silence(&mut self) -> Result<()> {
        match self.next_envelope_within(SILENCE_WINDOW).await? {
            None => Ok(()),
            Some(envelope) => anyhow::bail!("Unexpected envelope: {envelope}"),
        }
    }

    /// Close the socket
    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}

/// Create a test configuration
///
/// Defaults everywhere except a short DLR delay and a private static directory.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.relay.dlr_delay_ms = 100;
    config.relay.http_timeout_ms = 2_000;
    config
}

/// Create a fresh directory holding a console page
pub fn console_dir(page: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("sms-gateway-console-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("index.html"), page)?;
    Ok(dir)
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
