//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes y las encola en el pool de workers
//! 3. En cada worker: lee, parsea, rutea y responde
//! 4. Se detiene ordenadamente vía `ShutdownHandle`

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::{ConnectionError, Server, ShutdownHandle};
