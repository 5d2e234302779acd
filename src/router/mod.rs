//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea (método, path) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//!              │
//!              ├─ negocia Content-Encoding
//!              └─ presta el FileStore al handler
//! ```
//!
//! Las rutas se evalúan en el orden en que se registraron y gana la
//! primera que coincide (no hay longest-match). Si ninguna coincide se
//! retorna 404 con body vacío.

use crate::codec::{CodecError, ContentEncoding};
use crate::handlers;
use crate::http::{Method, Request, Response, StatusCode};
use crate::storage::FileStore;
use tracing::debug;

/// Tipo de función handler
///
/// Un handler recibe el Request y el contexto de la ruta, y retorna una
/// Response. Sólo falla si la compresión falla.
pub type Handler = fn(&Request, &RouteContext<'_>) -> Result<Response, RouteError>;

/// Lo que el router le presta a cada handler
pub struct RouteContext<'a> {
    /// Directorio servido
    pub store: &'a FileStore,

    /// Encoding negociado para este request (None = identity)
    pub encoding: Option<ContentEncoding>,
}

/// Cómo una ruta compara el path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// El path completo debe ser igual
    Exact(&'static str),

    /// Algún segmento del path (entre `/`) debe ser igual
    Segment(&'static str),
}

impl PathMatch {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(expected) => path == *expected,
            PathMatch::Segment(segment) => path.split('/').any(|s| s == *segment),
        }
    }
}

/// Error fatal durante el manejo de un request
///
/// Se traduce en cerrar la conexión sin response.
#[derive(Debug)]
pub enum RouteError {
    Codec(CodecError),
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::Codec(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Codec(e) => Some(e),
        }
    }
}

impl From<CodecError> for RouteError {
    fn from(e: CodecError) -> Self {
        RouteError::Codec(e)
    }
}

struct Route {
    method: Method,
    pattern: PathMatch,
    handler: Handler,
}

/// Router con tabla de rutas ordenada
pub struct Router {
    routes: Vec<Route>,
    store: FileStore,
}

impl Router {
    /// Crea un router vacío sobre el directorio dado
    pub fn new(store: FileStore) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Router con todas las rutas del servidor, en orden de prioridad
    ///
    /// | Método | Path | Handler |
    /// |---|---|---|
    /// | GET | `/` | bienvenida |
    /// | GET | segmento `echo` | echo (gzip si se negoció) |
    /// | GET | `/user-agent` | User-Agent del cliente |
    /// | GET | segmento `files` | leer archivo |
    /// | POST | segmento `files` | append al archivo |
    pub fn with_default_routes(store: FileStore) -> Self {
        let mut router = Self::new(store);
        router.register(Method::GET, PathMatch::Exact("/"), handlers::root_handler);
        router.register(Method::GET, PathMatch::Segment("echo"), handlers::echo_handler);
        router.register(Method::GET, PathMatch::Exact("/user-agent"), handlers::user_agent_handler);
        router.register(Method::GET, PathMatch::Segment("files"), handlers::read_file_handler);
        router.register(Method::POST, PathMatch::Segment("files"), handlers::write_file_handler);
        router
    }

    /// Registra una ruta al final de la tabla
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::router::{PathMatch, RouteContext, RouteError, Router};
    /// use http_pool_server::http::{Method, Request, Response};
    /// use http_pool_server::storage::FileStore;
    ///
    /// fn ping_handler(_req: &Request, _ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
    ///     Ok(Response::text("pong"))
    /// }
    ///
    /// let mut router = Router::new(FileStore::new("."));
    /// router.register(Method::GET, PathMatch::Exact("/ping"), ping_handler);
    /// ```
    pub fn register(&mut self, method: Method, pattern: PathMatch, handler: Handler) {
        self.routes.push(Route {
            method,
            pattern,
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si ninguna ruta coincide retorna 404 Not Found con body vacío.
    pub fn route(&self, request: &Request) -> Result<Response, RouteError> {
        let path = request.path();
        let ctx = RouteContext {
            store: &self.store,
            encoding: ContentEncoding::negotiate(request.header("Accept-Encoding")),
        };

        let route = self
            .routes
            .iter()
            .find(|route| route.method == request.method() && route.pattern.matches(path));

        let mut response = match route {
            Some(route) => {
                debug!(method = %request.method(), path, pattern = ?route.pattern, "route matched");
                (route.handler)(request, &ctx)?
            }
            None => {
                debug!(method = %request.method(), path, "no route");
                Response::not_found()
            }
        };

        Self::add_common_headers(&mut response);
        Ok(response)
    }

    /// Response para requests que no se pudieron parsear
    pub fn bad_request() -> Response {
        let mut response = Response::new(StatusCode::BadRequest);
        Self::add_common_headers(&mut response);
        response
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(response: &mut Response) {
        response.add_header("Connection", "close");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use std::fs;

    fn test_handler(_req: &Request, _ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
        Ok(Response::text("first"))
    }

    fn other_handler(_req: &Request, _ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
        Ok(Response::text("second"))
    }

    fn temp_router() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        (dir, router)
    }

    fn route_raw(router: &Router, raw: &[u8]) -> Response {
        let request = Request::parse(raw).unwrap();
        router.route(&request).unwrap()
    }

    // ==================== Tabla de rutas ====================

    #[test]
    fn test_router_creation() {
        let router = Router::new(FileStore::new("."));
        assert_eq!(router.routes.len(), 0);
    }

    #[test]
    fn test_default_routes_registered() {
        let (_dir, router) = temp_router();
        assert_eq!(router.routes.len(), 5);
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new(FileStore::new("."));
        router.register(Method::GET, PathMatch::Segment("a"), test_handler);
        router.register(Method::GET, PathMatch::Exact("/a/b"), other_handler);

        let response = route_raw(&router, b"GET /a/b HTTP/1.1\r\n\r\n");
        assert_eq!(response.body(), b"first");
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new(FileStore::new("."));
        router.register(Method::POST, PathMatch::Exact("/x"), test_handler);

        let response = route_raw(&router, b"GET /x HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_path_match() {
        assert!(PathMatch::Exact("/").matches("/"));
        assert!(!PathMatch::Exact("/").matches("/x"));
        assert!(PathMatch::Segment("echo").matches("/echo/abc"));
        assert!(PathMatch::Segment("echo").matches("/echo"));
        assert!(!PathMatch::Segment("echo").matches("/echoes/abc"));
    }

    // ==================== Rutas por defecto ====================

    #[test]
    fn test_root() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), handlers::WELCOME_BODY.as_bytes());
        assert_eq!(response.header("Content-Encoding"), None);
    }

    #[test]
    fn test_echo_plain() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /echo/abc HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"abc");
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.header("Content-Encoding"), None);
    }

    #[test]
    fn test_echo_gzip() {
        let (_dir, router) = temp_router();
        let response = route_raw(
            &router,
            b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: invalid-1, gzip, invalid-2\r\n\r\n",
        );

        assert_eq!(response.header("Content-Encoding"), Some("gzip"));
        assert_eq!(codec::decompress(response.body()).unwrap(), b"abc");
    }

    #[test]
    fn test_echo_unknown_encoding_is_plain() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: br\r\n\r\n");

        assert_eq!(response.header("Content-Encoding"), None);
        assert_eq!(response.body(), b"abc");
    }

    #[test]
    fn test_user_agent() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /user-agent HTTP/1.1\r\nUser-Agent: foo/1.0\r\n\r\n");

        assert_eq!(response.body(), b"foo/1.0");
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_user_agent_absent_is_empty() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /user-agent HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_get_file() {
        let (dir, router) = temp_router();
        fs::write(dir.path().join("name.txt"), b"contents").unwrap();

        let response = route_raw(&router, b"GET /files/name.txt HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"contents");
        assert_eq!(response.header("Content-Type"), Some("application/octet-stream"));
    }

    #[test]
    fn test_get_missing_file() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /files/name.txt HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_post_file_appends_and_echoes_own_body() {
        let (dir, router) = temp_router();

        let first = route_raw(&router, b"POST /files/name.txt HTTP/1.1\r\n\r\nhello");
        let second = route_raw(&router, b"POST /files/name.txt HTTP/1.1\r\n\r\nworld");

        assert_eq!(first.status(), StatusCode::Created);
        assert_eq!(first.body(), b"hello");
        assert_eq!(second.status(), StatusCode::Created);
        assert_eq!(second.body(), b"world");
        assert_eq!(fs::read(dir.path().join("name.txt")).unwrap(), b"helloworld");
    }

    #[test]
    fn test_post_file_traversal_is_404() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"POST /files/../escape.txt HTTP/1.1\r\n\r\nx");

        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_unknown_path() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /nope HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_post_to_echo_is_404() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"POST /echo/abc HTTP/1.1\r\n\r\nbody");

        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_common_headers() {
        let (_dir, router) = temp_router();
        let response = route_raw(&router, b"GET /nope HTTP/1.1\r\n\r\n");
        assert_eq!(response.header("Connection"), Some("close"));

        let bad = Router::bad_request();
        assert_eq!(bad.status(), StatusCode::BadRequest);
        assert_eq!(bad.header("Connection"), Some("close"));
        assert!(bad.body().is_empty());
    }
}
