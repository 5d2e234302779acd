//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser mínimo de requests: una sola lectura del socket, sin keep-alive
//! ni chunked encoding.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/notes.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! User-Agent: curl/8.4.0\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD SP PATH SP VERSION` (la versión se descarta)
//! 2. **Headers**: Pares `Name: Value`, separados en el primer `": "`
//! 3. **Empty Line**: `\r\n\r\n` separa headers del body
//! 4. **Body**: Sólo para POST; todo lo que venga después del separador

use std::collections::HashMap;

/// Separador entre headers y body
const HEAD_BODY_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// POST - Enviar datos a un recurso
    POST,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es GET ni POST
    fn from_token(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
///
/// `method` y `path` nunca están vacíos: un request que no se puede
/// separar en sus tres tokens es un error de parsing, no un objeto a medias.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP (GET, POST)
    method: Method,

    /// Request-target tal cual llegó (ej: "/echo/abc")
    path: String,

    /// Headers HTTP tal como se transmitieron (el último repetido gana)
    headers: HashMap<String, String>,

    /// Body del request; vacío salvo en POST
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request vacío
    EmptyRequest,

    /// La request line no tiene método, path y versión
    InvalidRequestLine,

    /// Método HTTP no soportado
    UnsupportedMethod(String),

    /// La request line no es UTF-8 válido
    InvalidEncoding,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidEncoding => write!(f, "Request line is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea un request desde los bytes de una única lectura
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError)` - Request malformado
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_pool_server::http::Request;
    ///
    /// let raw = b"GET /echo/abc HTTP/1.1\r\nUser-Agent: foo/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/echo/abc");
    /// assert_eq!(request.header("User-Agent"), Some("foo/1.0"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        // 1. Separar head y body (sin separador => body vacío)
        let (head, body) = Self::split_head_body(buffer);

        let mut lines = Self::split_lines(head);

        // 2. Request line (tiene que ser UTF-8; el body puede ser binario)
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
        let request_line =
            std::str::from_utf8(request_line).map_err(|_| ParseError::InvalidEncoding)?;
        let (method, path) = Self::parse_request_line(request_line)?;

        // 3. Headers
        let headers = Self::parse_headers(lines);

        // 4. Body (sólo POST)
        let body = match method {
            Method::POST => body.to_vec(),
            Method::GET => Vec::new(),
        };

        Ok(Request {
            method,
            path,
            headers,
            body,
        })
    }

    /// Divide el buffer en el primer `\r\n\r\n`
    fn split_head_body(buffer: &[u8]) -> (&[u8], &[u8]) {
        match buffer
            .windows(HEAD_BODY_SEPARATOR.len())
            .position(|w| w == HEAD_BODY_SEPARATOR)
        {
            Some(pos) => (&buffer[..pos], &buffer[pos + HEAD_BODY_SEPARATOR.len()..]),
            None => (buffer, &[]),
        }
    }

    /// Separa el head en líneas terminadas en `\r\n`
    fn split_lines(head: &[u8]) -> impl Iterator<Item = &[u8]> {
        let mut rest = Some(head);

        std::iter::from_fn(move || {
            let current = rest?;
            match current.windows(2).position(|w| w == b"\r\n") {
                Some(pos) => {
                    rest = Some(&current[pos + 2..]);
                    Some(&current[..pos])
                }
                None => {
                    rest = None;
                    Some(current)
                }
            }
        })
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
        let mut parts = line.splitn(3, ' ');

        let method = parts.next().filter(|s| !s.is_empty());
        let path = parts.next().filter(|s| !s.is_empty());
        let version = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match (method, path, version) {
            (Some(method), Some(path), Some(_version)) => {
                Ok((Method::from_token(method)?, path.to_string()))
            }
            _ => Err(ParseError::InvalidRequestLine),
        }
    }

    /// Parsea los headers HTTP
    ///
    /// Las líneas sin `": "` o que no son UTF-8 se ignoran en vez de
    /// abortar el parsing.
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a [u8]>) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        for line in lines {
            let Ok(line) = std::str::from_utf8(line) else {
                continue;
            };
            if let Some((name, value)) = line.split_once(": ") {
                headers.insert(name.to_string(), value.to_string());
            }
        }

        headers
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    ///
    /// Busca primero el nombre exacto y, si no está, compara sin
    /// distinguir mayúsculas (los nombres de header no son case-sensitive).
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::http::Request;
    ///
    /// let raw = b"GET / HTTP/1.1\r\nuser-agent: test\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.header("User-Agent"), Some("test"));
    /// assert_eq!(request.header("Accept-Encoding"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(|s| s.as_str())
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
