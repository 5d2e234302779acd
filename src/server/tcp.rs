//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! El listener acepta conexiones y las encola en el `WorkerPool`. Cada
//! worker hace la secuencia completa para una conexión:
//!
//! ```text
//! read (una vez) → Request::parse → Router::route → Response::to_bytes → write → close
//! ```
//!
//! No hay keep-alive: la conexión se cierra al soltar el `TcpStream`.
//! Sin `--read-timeout-ms`, un cliente que no envía nada ocupa un worker
//! indefinidamente.

use crate::config::Config;
use crate::http::Request;
use crate::router::{RouteError, Router};
use crate::storage::FileStore;
use crate::workers::WorkerPool;
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Errores al atender una conexión
#[derive(Debug)]
pub enum ConnectionError {
    /// Fallo de lectura/escritura en el socket
    Io(std::io::Error),

    /// Fallo fatal del handler; la conexión se cierra sin response
    Route(RouteError),
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionError::Io(e) => write!(f, "I/O error: {}", e),
            ConnectionError::Route(e) => write!(f, "Handler error: {}", e),
        }
    }
}

impl std::error::Error for ConnectionError {}

impl From<std::io::Error> for ConnectionError {
    fn from(e: std::io::Error) -> Self {
        ConnectionError::Io(e)
    }
}

impl From<RouteError> for ConnectionError {
    fn from(e: RouteError) -> Self {
        ConnectionError::Route(e)
    }
}

/// Permite detener un `Server` desde otro thread
///
/// Marca el flag de parada y despierta al `accept` bloqueado con una
/// conexión local descartable.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
    wake_addr: Arc<Mutex<Option<SocketAddr>>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);

        let addr = *self
            .wake_addr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(mut addr) = addr {
            if addr.ip().is_unspecified() {
                let loopback = match addr.ip() {
                    IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                    IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
                };
                addr.set_ip(loopback);
            }
            // Si falla, el listener ya no está esperando
            let _ = TcpStream::connect_timeout(&addr, Duration::from_secs(1));
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn set_wake_addr(&self, addr: SocketAddr) {
        *self
            .wake_addr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(addr);
    }
}

/// Servidor HTTP/1.1 con pool fijo de workers
pub struct Server {
    config: Config,
    router: Arc<Router>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let store = FileStore::new(&config.directory);

        Self {
            router: Arc::new(Router::with_default_routes(store)),
            config,
            listener: None,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Abre el socket (si no estaba abierto) y retorna la dirección real
    ///
    /// Útil con puerto 0 para obtener el puerto asignado.
    pub fn bind(&mut self) -> std::io::Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return listener.local_addr();
        }

        let listener = TcpListener::bind(self.config.address())?;
        let addr = listener.local_addr()?;
        self.shutdown.set_wake_addr(addr);
        self.listener = Some(listener);

        info!(%addr, "listening");
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Loop de aceptación; retorna cuando se pide el apagado y todos los
    /// workers terminaron
    pub fn run(&mut self) -> std::io::Result<()> {
        if self.config.workers == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "worker pool needs at least one worker",
            ));
        }

        self.bind()?;
        let listener = match &self.listener {
            Some(listener) => listener,
            None => return Err(std::io::Error::other("listener not bound")),
        };

        let router = Arc::clone(&self.router);
        let buffer_size = self.config.buffer_size;
        let read_timeout = self.config.read_timeout();

        let mut pool = WorkerPool::new(self.config.workers, move |stream: TcpStream| {
            Self::serve(stream, &router, buffer_size, read_timeout)
        })?;
        info!(workers = pool.size(), "worker pool started");

        if !self.shutdown.is_shutdown() {
            for stream in listener.incoming() {
                if self.shutdown.is_shutdown() {
                    break;
                }

                match stream {
                    Ok(stream) => {
                        if let Err(e) = pool.submit(stream) {
                            warn!(error = %e, "connection dropped");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                    }
                }
            }
        }

        info!(queued = pool.queued(), "shutting down, draining queued connections");
        pool.shutdown();
        info!("server stopped");
        Ok(())
    }

    /// Atiende una conexión en el worker actual y registra el resultado
    fn serve(mut stream: TcpStream, router: &Router, buffer_size: usize, read_timeout: Option<Duration>) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        match Self::handle_connection(&mut stream, router, buffer_size, read_timeout) {
            Ok(()) => {}
            Err(ConnectionError::Route(e)) => {
                error!(peer = %peer, error = %e, "request aborted, closing without response");
            }
            Err(ConnectionError::Io(e)) => {
                error!(peer = %peer, error = %e, "connection error");
            }
        }
    }

    /// Lee un request, lo rutea y escribe la response
    ///
    /// Un request que no se puede parsear recibe 400. Si el peer cierra
    /// sin enviar nada no se escribe nada.
    pub fn handle_connection(
        stream: &mut TcpStream,
        router: &Router,
        buffer_size: usize,
        read_timeout: Option<Duration>,
    ) -> Result<(), ConnectionError> {
        let start = Instant::now();
        stream.set_read_timeout(read_timeout)?;

        let mut buffer = vec![0u8; buffer_size];
        let bytes_read = stream.read(&mut buffer)?;

        if bytes_read == 0 {
            debug!("peer closed before sending a request");
            return Ok(());
        }

        let response = match Request::parse(&buffer[..bytes_read]) {
            Ok(request) => {
                let response = router.route(&request)?;
                let current = thread::current();
                info!(
                    worker = current.name().unwrap_or("-"),
                    method = %request.method(),
                    path = request.path(),
                    status = response.status().as_u16(),
                    "request handled"
                );
                response
            }
            Err(e) => {
                warn!(bytes = bytes_read, error = %e, "malformed request");
                Router::bad_request()
            }
        };

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        debug!(
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "response sent"
        );
        Ok(())
    }
}
