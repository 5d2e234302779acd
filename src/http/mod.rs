//! # Módulo HTTP
//!
//! Subconjunto de HTTP/1.1 implementado desde cero:
//!
//! - Parsing de requests (una lectura por conexión)
//! - Construcción y serialización de responses
//! - Códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! Accept-Encoding: gzip\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```
//!
//! No hay keep-alive, pipelining ni chunked encoding: cada conexión lleva
//! exactamente un request y una response.

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
