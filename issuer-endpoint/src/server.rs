//! Two-phase startup of the in-process issuer.
//!
//! 1. [`BoundIssuer::bind`] loads the assets and allocates both listeners.
//!    Ports are known from here on, so the issuer URL is too.
//! 2. [`BoundIssuer::start`] injects the externally visible URL
//!    ([`Handoff`]) and starts serving.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::config::IssuerConfig;
use crate::error::EndpointError;
use crate::handoff::Handoff;
use crate::identity::{issuer_url, validate_name, Scheme};
use crate::issuer_routes;
use crate::jwks::JwksResponse;

/// An issuer whose listeners are bound but not yet serving.
pub struct BoundIssuer {
    config: IssuerConfig,
    http: TcpListener,
    https: TcpListener,
    http_addr: SocketAddr,
    https_addr: SocketAddr,
    acceptor: TlsAcceptor,
    jwks: JwksResponse,
}

impl BoundIssuer {
    /// Load the published key and TLS material, then bind both listeners.
    pub async fn bind(config: IssuerConfig) -> Result<Self, EndpointError> {
        validate_name(&config.name)?;

        let jwks = JwksResponse::load(&config.keys)?;
        let acceptor = TlsAcceptor::from(config.tls.load_server_config()?);

        let http_addr = SocketAddr::new(config.bind_address, config.http_port);
        let https_addr = SocketAddr::new(config.bind_address, config.https_port);
        let (http, http_addr) = bind_listener("HTTP", http_addr).await?;
        let (https, https_addr) = bind_listener("HTTPS", https_addr).await?;

        debug!(name = %config.name, %http_addr, %https_addr, "Issuer listeners bound");

        Ok(Self {
            config,
            http,
            https,
            http_addr,
            https_addr,
            acceptor,
            jwks,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn https_addr(&self) -> SocketAddr {
        self.https_addr
    }

    /// The issuer URL clients should use, picked by the `secured` flag.
    pub fn url(&self) -> String {
        endpoint_url(&self.config, self.http_addr, self.https_addr)
    }

    /// Start serving with the endpoint's own URL as the handoff.
    pub fn launch(self) -> RunningIssuer {
        let handoff = Handoff::new(self.url());
        self.start(handoff)
    }

    /// Start serving, announcing `handoff` in the discovery document.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self, handoff: Handoff) -> RunningIssuer {
        let shutdown = CancellationToken::new();
        let connections = TaskTracker::new();
        let router = issuer_routes(
            &self.config.name,
            handoff.clone(),
            self.jwks,
            &self.config.public_dir,
        );

        let http_task = serve_http(self.http, router.clone(), shutdown.clone());
        let https_task = serve_https(
            self.https,
            self.acceptor,
            router,
            shutdown.clone(),
            connections.clone(),
        );
        let tasks = vec![tokio::spawn(http_task), tokio::spawn(https_task)];

        info!(
            name = %self.config.name,
            issuer = %handoff.issuer(),
            http = %self.http_addr,
            https = %self.https_addr,
            "Issuer endpoint started"
        );

        RunningIssuer {
            config: self.config,
            http_addr: self.http_addr,
            https_addr: self.https_addr,
            handoff,
            shutdown,
            tasks,
            connections,
        }
    }
}

impl IssuerConfig {
    /// Bind and start with the endpoint's own URL as the handoff.
    pub async fn start(self) -> Result<RunningIssuer, EndpointError> {
        Ok(BoundIssuer::bind(self).await?.launch())
    }
}

/// A serving issuer endpoint. Dropping it stops both listeners.
pub struct RunningIssuer {
    config: IssuerConfig,
    http_addr: SocketAddr,
    https_addr: SocketAddr,
    handoff: Handoff,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    connections: TaskTracker,
}

impl RunningIssuer {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn secured(&self) -> bool {
        self.config.secured
    }

    /// The issuer URL clients should use, picked by the `secured` flag.
    pub fn url(&self) -> String {
        endpoint_url(&self.config, self.http_addr, self.https_addr)
    }

    /// Issuer URL on the plain HTTP listener.
    pub fn http_url(&self) -> String {
        issuer_url(
            Scheme::Http,
            &self.config.host,
            self.http_addr.port(),
            &self.config.name,
        )
    }

    /// Issuer URL on the HTTPS listener.
    pub fn https_url(&self) -> String {
        issuer_url(
            Scheme::Https,
            &self.config.host,
            self.https_addr.port(),
            &self.config.name,
        )
    }

    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn https_addr(&self) -> SocketAddr {
        self.https_addr
    }

    /// The URL the discovery document announces.
    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    /// CA certificate clients must trust to reach the HTTPS listener.
    pub fn ca_file(&self) -> &PathBuf {
        &self.config.tls.ca_file
    }

    /// Stop both listeners, close every open connection and wait for all of
    /// them to finish.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!(error = %e, "Issuer listener task failed");
            }
        }
        self.connections.close();
        self.connections.wait().await;
        info!(name = %self.config.name, "Issuer endpoint stopped");
    }
}

impl Drop for RunningIssuer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn endpoint_url(config: &IssuerConfig, http_addr: SocketAddr, https_addr: SocketAddr) -> String {
    let port = if config.secured {
        https_addr.port()
    } else {
        http_addr.port()
    };
    issuer_url(
        Scheme::for_secured(config.secured),
        &config.host,
        port,
        &config.name,
    )
}

async fn bind_listener(
    listener: &'static str,
    addr: SocketAddr,
) -> Result<(TcpListener, SocketAddr), EndpointError> {
    let bind_error = |source| EndpointError::Bind {
        listener,
        addr,
        source,
    };
    let socket = TcpListener::bind(addr).await.map_err(bind_error)?;
    let local = socket.local_addr().map_err(bind_error)?;
    Ok((socket, local))
}

async fn serve_http(listener: TcpListener, router: Router, shutdown: CancellationToken) {
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await;
    if let Err(e) = result {
        warn!(error = %e, "HTTP listener stopped with an error");
    }
}

async fn serve_https(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    router: Router,
    shutdown: CancellationToken,
    connections: TaskTracker,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(connection) => connection,
                Err(e) => {
                    warn!(error = %e, "Failed to accept HTTPS connection");
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let router = router.clone();
        let shutdown = shutdown.clone();

        // Covers the handshake too: a client that never sends a ClientHello
        // must not outlive `stop`.
        connections.spawn(async move {
            tokio::select! {
                _ = serve_tls_connection(stream, peer, acceptor, router) => {}
                _ = shutdown.cancelled() => {}
            }
        });
    }
}

async fn serve_tls_connection(
    stream: TcpStream,
    peer: SocketAddr,
    acceptor: TlsAcceptor,
    router: Router,
) {
    let stream = match acceptor.accept(stream).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(%peer, error = %e, "TLS handshake failed");
            return;
        }
    };

    let service = TowerToHyperService::new(router);
    let builder = auto::Builder::new(TokioExecutor::new());
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    if let Err(e) = connection.await {
        debug!(%peer, error = %e, "HTTPS connection closed with an error");
    }
}
