//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Acumulador de status, headers y body que se serializa una sola vez al
//! final del request.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```
//!
//! Los headers salen en orden de inserción y `Content-Length` siempre va
//! último, calculado del body final. Cualquier valor que haya puesto el
//! handler se ignora.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_pool_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"Content-Length: 5\r\n\r\nHello"));
//! ```

use super::StatusCode;

/// Header que el serializador calcula por su cuenta
const CONTENT_LENGTH: &str = "Content-Length";

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Código de estado HTTP (200 por defecto)
    status: StatusCode,

    /// Headers en orden de inserción, sin nombres repetidos
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (ya comprimido si corresponde)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// Por defecto, la respuesta no tiene headers ni body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// 404 sin body
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    /// 200 con `Content-Type: text/plain`
    pub fn text(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body_bytes(body.into())
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe en su posición original.
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "text/plain");
    /// assert_eq!(response.header("content-type"), Some("text/plain"));
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo de la respuesta desde un string
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para respuestas binarias (archivos, gzip, etc.)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Reemplaza el body (versión mutable)
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Cambia el código de estado
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`, en orden de inserción
    /// - `Content-Length` con el largo real del body
    /// - Línea vacía: `\r\n`
    /// - Body: sin transformar
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        // 2. Headers (Content-Length lo calculamos nosotros)
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        result.extend_from_slice(format!("{}: {}\r\n", CONTENT_LENGTH, self.body.len()).as_bytes());

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");

        // 4. Body
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene los headers en orden de inserción
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene un header por nombre (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
