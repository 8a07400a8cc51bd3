//! Connection lifecycle.
//!
//! The handle owns the single live transport. Only `connect` and `close`
//! change its state; analyses borrow the transport through short-lived
//! [`Session`]s and never reconfigure or tear it down.

use std::fmt;
use std::sync::Arc;

use grapheda_core::{ConnectionConfig, GraphEdaError, GraphEdaResult, ResultRecord};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::transport::{GraphConnector, GraphTransport, Statement};

/// Observable lifecycle state of a [`ConnectionHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

enum HandleState {
    Disconnected,
    Connected(Arc<dyn GraphTransport>),
    Closed,
}

pub struct ConnectionHandle {
    connector: Arc<dyn GraphConnector>,
    state: RwLock<HandleState>,
}

impl ConnectionHandle {
    pub fn new(connector: Arc<dyn GraphConnector>) -> Self {
        Self {
            connector,
            state: RwLock::new(HandleState::Disconnected),
        }
    }

    /// Open the connection.
    ///
    /// The config is validated before any network call. Connecting an
    /// already connected handle is a no-op; a closed handle stays closed.
    /// The handshake runs without holding the state lock, so `state` and
    /// `session` stay responsive; if another caller connects or closes the
    /// handle meanwhile, the transport opened here is released.
    pub async fn connect(&self, config: &ConnectionConfig) -> GraphEdaResult<()> {
        config.validate()?;

        match &*self.state.read().await {
            HandleState::Closed => return Err(GraphEdaError::ConnectionClosed),
            HandleState::Connected(_) => {
                debug!("connect() on an open handle, keeping existing connection");
                return Ok(());
            }
            HandleState::Disconnected => {}
        }

        let transport = self.connector.open(config).await?;

        let mut state = self.state.write().await;
        if matches!(*state, HandleState::Disconnected) {
            *state = HandleState::Connected(transport);
            return Ok(());
        }
        let closed = matches!(*state, HandleState::Closed);
        drop(state);

        transport.close().await;
        if closed {
            Err(GraphEdaError::ConnectionClosed)
        } else {
            debug!("Handle connected concurrently, released the extra transport");
            Ok(())
        }
    }

    /// Acquire a session for one query.
    pub async fn session(&self) -> GraphEdaResult<Session> {
        match &*self.state.read().await {
            HandleState::Connected(transport) => Ok(Session {
                transport: Arc::clone(transport),
            }),
            HandleState::Disconnected => Err(GraphEdaError::NotConnected),
            HandleState::Closed => Err(GraphEdaError::ConnectionClosed),
        }
    }

    /// Move to `Closed`, releasing the transport. Idempotent.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.state.write().await, HandleState::Closed);
        if let HandleState::Connected(transport) = previous {
            transport.close().await;
            info!("Connection closed");
        }
    }

    pub async fn state(&self) -> ConnectionState {
        match &*self.state.read().await {
            HandleState::Disconnected => ConnectionState::Disconnected,
            HandleState::Connected(_) => ConnectionState::Connected,
            HandleState::Closed => ConnectionState::Closed,
        }
    }
}

/// A scoped borrow of the live transport, good for exactly one statement.
///
/// Consumed by [`Session::run`]; dropping it (including by cancelling the
/// run) gives everything back.
pub struct Session {
    transport: Arc<dyn GraphTransport>,
}

impl Session {
    pub async fn run(self, statement: &Statement<'_>) -> GraphEdaResult<Vec<ResultRecord>> {
        self.transport.run(statement).await
    }
}
