//! # HTTP Pool Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo y concurrente: acepta conexiones TCP, parsea
//! un request por conexión, lo despacha a un pool fijo de workers y
//! responde antes de cerrar.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing de requests, construcción de responses, status codes
//! - `codec`: Compresión gzip y negociación de `Accept-Encoding`
//! - `storage`: Lectura/append de archivos en el directorio servido
//! - `router`: Tabla de rutas ordenada
//! - `handlers`: Un handler por ruta (echo, user-agent, archivos)
//! - `workers`: Cola de conexiones y pool de threads
//! - `server`: Listener TCP y pipeline por conexión
//! - `config`: Configuración CLI / variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_pool_server::config::Config;
//! use http_pool_server::server::Server;
//!
//! let mut server = Server::new(Config::default());
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod codec;
pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod storage;
pub mod workers;
