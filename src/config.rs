//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_pool_server --port 4221 --directory /tmp/files --workers 8
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=4221 SERVE_DIR=/tmp/files ./http_pool_server
//! ```

use clap::Parser;
use std::time::Duration;

/// Tamaño mínimo razonable del buffer de lectura
const MIN_BUFFER_SIZE: usize = 16;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "http_pool_server")]
#[command(about = "Servidor HTTP/1.1 concurrente con pool fijo de workers")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio donde se guardan/leen archivos (/files/...)
    #[arg(short, long, default_value = "./data", env = "SERVE_DIR")]
    pub directory: String,

    /// Número fijo de workers
    #[arg(short, long, default_value = "4", env = "WORKERS")]
    pub workers: usize,

    /// Bytes leídos por request (una sola lectura; limita el tamaño del request)
    #[arg(long = "buffer-size", default_value = "1024", env = "BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "0", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http_pool_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout de lectura, `None` si está deshabilitado
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }

        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(format!("Buffer size must be >= {} bytes", MIN_BUFFER_SIZE));
        }

        if self.directory.trim().is_empty() {
            return Err("Serving directory must not be empty".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════╗");
        println!("║        http_pool_server configuration        ║");
        println!("╚══════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Directory:    {}", self.directory);
        println!();
        println!("👷 Workers:");
        println!("   Pool size:    {}", self.workers);
        println!("   Read buffer:  {} bytes", self.buffer_size);
        match self.read_timeout() {
            Some(timeout) => println!("   Read timeout: {} ms", timeout.as_millis()),
            None => println!("   Read timeout: disabled"),
        }
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 4221,
            host: "127.0.0.1".to_string(),
            directory: "./data".to_string(),
            workers: 4,
            buffer_size: 1024,
            read_timeout_ms: 0,
        }
    }
}
