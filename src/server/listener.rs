//! Bound server and its run loop

use std::{future::Future, net::SocketAddr};

use axum::Router;
use tokio::net::TcpListener;

use super::router::{ServerState, build_router};
use crate::{Result, app::App, error::Error};

pub struct Server {
    listener: TcpListener,
    routes: Router,
}

impl Server {
    /// Bind to the configured address.
    pub async fn bind(app: &App) -> Result<Self> {
        Self::bind_to(app.config().bind_addr()?, app).await
    }

    /// Bind to `addr`, ignoring the configured one. Port 0 picks a free port.
    pub async fn bind_to(addr: SocketAddr, app: &App) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|source| Error::Io {
            operation: format!("bind {addr}"),
            source,
        })?;
        Ok(Self {
            listener,
            routes: build_router(ServerState::from_app(app)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process is killed.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves. The listener closes at once; upgraded
    /// WebSockets keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "listening");
        axum::serve(
            self.listener,
            self.routes
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("shutting down");
        })
        .await
        .map_err(|source| Error::Io {
            operation: format!("serve on {addr}"),
            source,
        })
    }
}
