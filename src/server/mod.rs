//! HTTP server exposing the incident store

use crate::error::Result;
use crate::source::RecordSource;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Route serving the full incident list
pub const INCIDENTS_ROUTE: &str = "/api/v1/list/incidents";

/// Serves a [`RecordSource`] over HTTP
#[derive(Clone)]
pub struct IncidentServer {
    source: Arc<dyn RecordSource>,
}

impl IncidentServer {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// Build the API router
    pub fn router(&self) -> Router {
        Router::new()
            .route(INCIDENTS_ROUTE, get(list_incidents))
            .with_state(Arc::clone(&self.source))
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight requests
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(
            "Serving incidents from {} on http://{}{}",
            self.source.describe(),
            addr,
            INCIDENTS_ROUTE
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Incident server on {} stopped", addr);
        Ok(())
    }
}

/// Bind a TCP listener on `addr`
pub async fn bind(addr: &str) -> Result<TcpListener> {
    Ok(TcpListener::bind(addr).await?)
}

async fn list_incidents(State(source): State<Arc<dyn RecordSource>>) -> Response {
    match source.fetch().await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            warn!("Failed to load incidents from {}: {}", source.describe(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
