//! HTTP/1.1 transport for the webhook.
//!
//! The server accepts connections on a TCP listener, serves each one on its
//! own task and hands `POST <webhook_path>` bodies to the [`Dispatcher`].
//! Every other path answers 404, and every other method on the webhook path
//! answers 405. Bodies over the configured limit answer 413 and bodies that
//! do not arrive within the request timeout answer 408.
//!
//! # Example
//!
//! ```rust,no_run
//! use dialogs_core::{InputData, OutputData, Response};
//! use dialogs_server::{Dispatcher, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(|input: InputData| async move {
//!         OutputData::new(&input, Response::new("Hello!", "", false))
//!     });
//!
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!     Server::new(config, dispatcher).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::ALLOW;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::{DispatchError, ServerError};
use crate::handler::BoxError;
use crate::pipeline::{empty_response, Dispatcher, HttpResponse};
use crate::shutdown::{InFlight, ShutdownSignal};

/// The webhook HTTP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    dispatcher: Dispatcher,
}

impl Server {
    /// Creates a server that routes webhook calls to `dispatcher`.
    #[must_use]
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs the server until SIGTERM or SIGINT is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid or cannot be
    /// bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid or cannot be
    /// bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// triggers, then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            path = self.config.webhook_path(),
            "Webhook server listening"
        );

        let server = Arc::new(self);
        let in_flight = InFlight::new();
        let stop = shutdown.recv();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let guard = in_flight.enter();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(remote = %remote_addr, error = %e, "Connection error");
                                }
                                drop(guard);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                        }
                    }
                }

                () = &mut stop => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }
        drop(listener);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            connections = in_flight.count(),
            "Waiting for open connections"
        );

        if tokio::time::timeout(shutdown_timeout, in_flight.drained())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = in_flight.count(),
                "Shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("Webhook server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);
        let stop = shutdown.recv();
        tokio::pin!(stop);

        tokio::select! {
            result = conn.as_mut() => return result,
            () = &mut stop => {
                tracing::debug!(remote = %remote_addr, "Closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
            }
        }

        conn.await
    }

    async fn handle_request(&self, req: Request<Incoming>) -> Result<HttpResponse, Infallible> {
        if let Some(rejection) = self.reject(req.method(), req.uri().path()) {
            return Ok(rejection);
        }

        let limit = self.config.max_body_size();
        let body =
            tokio::time::timeout(self.config.request_timeout(), collect_body(req, limit)).await;
        let response = match body {
            Ok(Ok(body)) => self.dispatcher.dispatch(body).await,
            Ok(Err(e)) if e.is::<LengthLimitError>() => {
                tracing::warn!(limit, "Request body too large");
                empty_response(StatusCode::PAYLOAD_TOO_LARGE)
            }
            Ok(Err(e)) => {
                let error = DispatchError::BodyRead(e.to_string());
                self.dispatcher.report(&error);
                empty_response(error.status_code())
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                empty_response(StatusCode::REQUEST_TIMEOUT)
            }
        };

        Ok(response)
    }

    /// Answers requests that are not webhook calls.
    fn reject(&self, method: &Method, path: &str) -> Option<HttpResponse> {
        if path != self.config.webhook_path() {
            tracing::debug!(%method, path, "No route");
            return Some(empty_response(StatusCode::NOT_FOUND));
        }

        if method != Method::POST {
            tracing::debug!(%method, path, "Method not allowed");
            let mut response = empty_response(StatusCode::METHOD_NOT_ALLOWED);
            response
                .headers_mut()
                .insert(ALLOW, http::HeaderValue::from_static("POST"));
            return Some(response);
        }

        None
    }
}

async fn collect_body(req: Request<Incoming>, limit: usize) -> Result<Bytes, BoxError> {
    let collected = Limited::new(req.into_body(), limit).collect().await?;
    Ok(collected.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use dialogs_core::{InputData, OutputData};

    fn server(config: ServerConfig) -> Server {
        Server::new(
            config,
            Dispatcher::new(|input: InputData| async move {
                OutputData::new(&input, dialogs_core::Response::new("ok", "", false))
            }),
        )
    }

    #[test]
    fn test_reject_unknown_path() {
        let server = server(ServerConfig::builder().webhook_path("/alice").build());

        let response = server.reject(&Method::POST, "/other").unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reject_wrong_method() {
        let server = server(ServerConfig::default());

        let response = server.reject(&Method::GET, "/").unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST");
    }

    #[test]
    fn test_accept_webhook_post() {
        let server = server(ServerConfig::builder().webhook_path("/alice").build());
        assert!(server.reject(&Method::POST, "/alice").is_none());
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let server = server(
            ServerConfig::builder()
                .http_addr("not-a-valid-address")
                .build(),
        );

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        match result {
            Err(ServerError::Bind(msg)) => assert!(msg.contains("invalid address")),
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let server = server(
            ServerConfig::builder()
                .http_addr("127.0.0.1:0")
                .shutdown_timeout(Duration::from_millis(100))
                .build(),
        );

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result =
            tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
