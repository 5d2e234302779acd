//! # Handlers
//! src/handlers/mod.rs
//!
//! Un handler por comportamiento del servidor:
//!
//! - `/`: texto de bienvenida
//! - `/echo/{texto}`: devuelve `{texto}`, comprimido con gzip si se negoció
//! - `/user-agent`: devuelve el header `User-Agent`
//! - `GET /files/{nombre}`: contenido del archivo
//! - `POST /files/{nombre}`: append del body al archivo, responde 201 con
//!   el body recibido

use crate::codec;
use crate::http::{Request, Response, StatusCode};
use crate::router::{RouteContext, RouteError};
use crate::storage::StoreError;
use tracing::{debug, warn};

/// Body fijo de `GET /`
pub const WELCOME_BODY: &str = "Welcome to http_pool_server!";

/// Todo lo que sigue a `/{segment}/` en el path, o "" si no aparece
fn suffix_after_segment<'a>(path: &'a str, segment: &str) -> &'a str {
    let marker = format!("/{}/", segment);
    path.find(&marker)
        .map(|pos| &path[pos + marker.len()..])
        .unwrap_or("")
}

/// Handler para `GET /`
pub fn root_handler(_req: &Request, _ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
    Ok(Response::text(WELCOME_BODY))
}

/// Handler para `GET /echo/{texto}`
///
/// Si el cliente aceptó gzip, el body va comprimido y se agrega
/// `Content-Encoding`. Un fallo del compresor aborta el request.
pub fn echo_handler(req: &Request, ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
    let text = suffix_after_segment(req.path(), "echo");
    let mut response = Response::text(text);

    if let Some(encoding) = ctx.encoding {
        response.set_body(codec::compress(text.as_bytes())?);
        response.add_header("Content-Encoding", encoding.as_str());
    }

    Ok(response)
}

/// Handler para `GET /user-agent`
pub fn user_agent_handler(req: &Request, _ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
    Ok(Response::text(req.header("User-Agent").unwrap_or("")))
}

/// Handler para `GET /files/{nombre}`
pub fn read_file_handler(req: &Request, ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
    let name = suffix_after_segment(req.path(), "files");

    match ctx.store.read(name) {
        Ok(contents) => Ok(Response::new(StatusCode::Ok)
            .with_header("Content-Type", "application/octet-stream")
            .with_body_bytes(contents)),
        Err(e) => {
            debug!(file = name, error = %e, "file read failed");
            Ok(Response::not_found())
        }
    }
}

/// Handler para `POST /files/{nombre}`
///
/// Los errores de escritura también salen como 404.
pub fn write_file_handler(req: &Request, ctx: &RouteContext<'_>) -> Result<Response, RouteError> {
    let name = suffix_after_segment(req.path(), "files");

    match ctx.store.append(name, req.body()) {
        Ok(()) => Ok(Response::new(StatusCode::Created).with_body_bytes(req.body().to_vec())),
        Err(e @ StoreError::WriteFailure(_)) => {
            warn!(file = name, error = %e, "file write failed");
            Ok(Response::not_found())
        }
        Err(e) => {
            debug!(file = name, error = %e, "file write rejected");
            Ok(Response::not_found())
        }
    }
}
