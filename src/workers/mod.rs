//! # Sistema de Workers
//! src/workers/mod.rs
//!
//! Desacopla la aceptación de conexiones de su procesamiento:
//!
//! ```text
//! Listener ──push──▶ ConnectionQueue ──pop──▶ Worker 0..N
//! ```
//!
//! El listener es el único productor y los workers los únicos
//! consumidores. La cola no tiene límite: no hay backpressure hacia el
//! listener.

pub mod pool;
pub mod queue;

pub use pool::{PoolError, WorkerPool};
pub use queue::ConnectionQueue;
