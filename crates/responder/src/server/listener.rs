//! TLS accept loop and the optional cleartext listener.
//!
//! Lifecycle:
//! 1. [`Responder`] holds a parsed TLS configuration and the route table.
//! 2. [`Responder::bind`] binds the socket(s) and yields [`Listening`].
//! 3. [`Listening::serve`] accepts connections until the process is killed.
//!    Each connection is handshaken and served on its own Tokio task, so a
//!    failing client never stops the loop.

use std::{
    convert::Infallible,
    io,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::Router;
use hyper::{body::Incoming, Request};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as AutoBuilder,
};
use rustls::ServerConfig;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tower::Service;
use tracing::{debug, error, info, warn};

use super::{
    error::StartupError,
    tls::{load_server_config, TlsMinVersion},
};

/// Pause after a failed `accept` (e.g. `EMFILE`) before trying again.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Everything [`start`] needs to bring the responder up.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub bind_addr: SocketAddr,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub min_version: TlsMinVersion,
    /// Cleartext listener over the same routes, disabled when `None`.
    pub plaintext_addr: Option<SocketAddr>,
}

/// Load the TLS identity, bind, and serve forever.
///
/// Identity material is loaded and validated before any socket is bound, so a
/// bad certificate or key never leaves a half-started listener behind.
///
/// # Errors
///
/// Returns a [`StartupError`] if the identity cannot be loaded or an address
/// cannot be bound. Once listening, this function does not return.
pub async fn start(cfg: &ListenerConfig, router: Router) -> Result<Infallible, StartupError> {
    let tls = load_server_config(&cfg.cert_path, &cfg.key_path, cfg.min_version)?;
    info!(
        cert = %cfg.cert_path.display(),
        min_tls = ?cfg.min_version,
        "TLS identity loaded"
    );

    let listening = Responder::new(tls, router)
        .with_plaintext(cfg.plaintext_addr)
        .bind(cfg.bind_addr)
        .await?;
    Ok(listening.serve().await)
}

/// An unstarted responder: TLS material parsed, nothing bound yet.
pub struct Responder {
    tls: Arc<ServerConfig>,
    router: Router,
    plaintext_addr: Option<SocketAddr>,
}

impl Responder {
    pub fn new(tls: Arc<ServerConfig>, router: Router) -> Self {
        Self {
            tls,
            router,
            plaintext_addr: None,
        }
    }

    /// Also serve the routes without TLS on `addr`.
    ///
    /// Clients there speak HTTP/1.1 (or HTTP/2 with prior knowledge); browsers
    /// only ever reach HTTP/2 through the TLS listener.
    pub fn with_plaintext(mut self, addr: Option<SocketAddr>) -> Self {
        self.plaintext_addr = addr;
        self
    }

    /// Bind the TLS listener (and the cleartext one, if configured).
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Bind`] if any address is unavailable.
    pub async fn bind(self, addr: SocketAddr) -> Result<Listening, StartupError> {
        let (listener, local_addr) = bind_tcp(addr).await?;
        info!(addr = %local_addr, "listening for HTTPS (h2, http/1.1)");

        let plaintext = match self.plaintext_addr {
            Some(addr) => {
                let (listener, local_addr) = bind_tcp(addr).await?;
                info!(addr = %local_addr, "listening for cleartext HTTP");
                Some((listener, local_addr))
            }
            None => None,
        };

        Ok(Listening {
            listener,
            local_addr,
            plaintext,
            acceptor: TlsAcceptor::from(self.tls),
            router: self.router,
        })
    }
}

/// A bound responder, ready to accept connections.
pub struct Listening {
    listener: TcpListener,
    local_addr: SocketAddr,
    plaintext: Option<(TcpListener, SocketAddr)>,
    acceptor: TlsAcceptor,
    router: Router,
}

impl Listening {
    /// Address the TLS listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address the cleartext listener is bound to, if enabled.
    pub fn plaintext_addr(&self) -> Option<SocketAddr> {
        self.plaintext.as_ref().map(|(_, addr)| *addr)
    }

    /// Accept loop: terminate TLS and serve each connection on its own task.
    ///
    /// Runs until the process is killed.
    pub async fn serve(self) -> Infallible {
        info!(
            addr = %self.local_addr(),
            plaintext_addr = ?self.plaintext_addr(),
            "accepting connections"
        );
        if let Some((listener, addr)) = self.plaintext {
            let router = self.router.clone();
            tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, router).await {
                    error!(%addr, error = %e, "cleartext listener stopped");
                }
            });
        }

        loop {
            match self.listener.accept().await {
                Ok((tcp_stream, peer_addr)) => {
                    debug!(%peer_addr, "accepted TCP connection");
                    let acceptor = self.acceptor.clone();
                    let router = self.router.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(tcp_stream, acceptor, router).await {
                            warn!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => back_off_after_accept_error(&e).await,
            }
        }
    }
}

async fn back_off_after_accept_error(e: &io::Error) {
    error!(error = %e, retry_in = ?ACCEPT_ERROR_BACKOFF, "accept error");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

async fn bind_tcp(addr: SocketAddr) -> Result<(TcpListener, SocketAddr), StartupError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    let local_addr = listener.local_addr().map_err(StartupError::LocalAddr)?;
    Ok((listener, local_addr))
}

/// Handshake one TLS connection and serve HTTP on it until the peer goes away.
async fn handle_connection(tcp: TcpStream, acceptor: TlsAcceptor, router: Router) -> Result<()> {
    let tls = acceptor.accept(tcp).await.context("TLS handshake failed")?;
    {
        let (_, session) = tls.get_ref();
        debug!(
            alpn = ?session.alpn_protocol().map(String::from_utf8_lossy),
            tls_version = ?session.protocol_version(),
            "TLS session established"
        );
    }

    // hyper-util picks HTTP/1.1 or HTTP/2 from the connection preface, which
    // follows whatever ALPN settled on.
    let service = hyper::service::service_fn(move |req: Request<Incoming>| {
        router.clone().call(req)
    });
    AutoBuilder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(tls), service)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
