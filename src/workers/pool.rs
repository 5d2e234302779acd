//! # Pool de Workers
//! src/workers/pool.rs
//!
//! N threads fijos consumiendo una `ConnectionQueue`. Cada elemento lo
//! procesa de principio a fin un único worker.
//!
//! ## Apagado
//!
//! `shutdown()` cierra la cola (no entra trabajo nuevo), los workers
//! ociosos se despiertan y salen, y los que están ocupados terminan su
//! elemento actual y además vacían lo que quedó encolado antes de salir.

use super::queue::ConnectionQueue;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Errores del pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// El pool ya no acepta trabajo
    ShuttingDown,
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::ShuttingDown => write!(f, "Worker pool is shutting down"),
        }
    }
}

impl std::error::Error for PoolError {}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

/// Pool de tamaño fijo
pub struct WorkerPool<T> {
    queue: ConnectionQueue<T>,
    workers: Vec<Worker>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Crea el pool y arranca `size` workers que ejecutan `handler`
    ///
    /// # Panics
    ///
    /// Si `size` es 0.
    pub fn new<F>(size: usize, handler: F) -> std::io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        assert!(size > 0, "worker pool needs at least one worker");

        let handler = Arc::new(handler);
        // Si un spawn falla, el Drop de `pool` libera a los ya creados
        let mut pool = Self {
            queue: ConnectionQueue::new(),
            workers: Vec::with_capacity(size),
        };

        for id in 0..size {
            let queue = pool.queue.clone();
            let handler = Arc::clone(&handler);

            let thread = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || Self::worker_loop(id, queue, handler))?;

            pool.workers.push(Worker {
                id,
                thread: Some(thread),
            });
        }

        Ok(pool)
    }

    /// Loop principal del worker
    fn worker_loop<F>(id: usize, queue: ConnectionQueue<T>, handler: Arc<F>)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        debug!(worker = id, "worker started");

        while let Some(item) = queue.pop() {
            // Un pánico sólo pierde este elemento, no el worker
            if panic::catch_unwind(AssertUnwindSafe(|| handler(item))).is_err() {
                error!(worker = id, "handler panicked, item dropped");
            }
        }

        debug!(worker = id, "worker stopped");
    }

    /// Encola trabajo para el próximo worker libre
    pub fn submit(&self, item: T) -> Result<(), PoolError> {
        self.queue.push(item).map_err(|_| PoolError::ShuttingDown)
    }
}

impl<T> WorkerPool<T> {
    /// Número de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Elementos esperando a un worker
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Cierra la cola y espera a que todos los workers terminen
    ///
    /// Es idempotente.
    pub fn shutdown(&mut self) {
        self.queue.close();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    error!(worker = worker.id, "worker thread panicked");
                }
            }
        }
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_pool_size() {
        let pool = WorkerPool::new(3, |_: u32| {}).unwrap();
        assert_eq!(pool.size(), 3);
    }

    #[test]
    #[should_panic]
    fn test_zero_workers_panics() {
        let _ = WorkerPool::new(0, |_: u32| {});
    }

    #[test]
    fn test_every_item_processed_exactly_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut pool = {
            let seen = Arc::clone(&seen);
            WorkerPool::new(4, move |i: usize| seen.lock().unwrap().push(i)).unwrap()
        };

        for i in 0..500 {
            pool.submit(i).unwrap();
        }
        pool.shutdown();

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_after_shutdown() {
        let mut pool = WorkerPool::new(1, |_: u32| {}).unwrap();
        pool.shutdown();

        assert_eq!(pool.submit(1), Err(PoolError::ShuttingDown));
    }

    #[test]
    fn test_shutdown_drains_queued_and_in_flight() {
        let done = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = mpsc::channel();
        let started_tx = Mutex::new(started_tx);

        let mut pool = {
            let done = Arc::clone(&done);
            WorkerPool::new(2, move |_: u32| {
                let _ = started_tx.lock().unwrap().send(());
                thread::sleep(Duration::from_millis(30));
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        };

        for i in 0..6 {
            pool.submit(i).unwrap();
        }
        // Al menos un elemento en vuelo antes de apagar
        started_rx.recv().unwrap();
        pool.shutdown();

        assert_eq!(done.load(Ordering::SeqCst), 6);
        assert_eq!(pool.queued(), 0);
    }

    #[test]
    fn test_idle_workers_released_on_shutdown() {
        let mut pool = WorkerPool::new(8, |_: u32| {}).unwrap();
        // Sin trabajo: shutdown no debe quedarse colgado
        pool.shutdown();
        pool.shutdown();
    }

    #[test]
    fn test_panicking_handler_keeps_worker_alive() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut pool = {
            let done = Arc::clone(&done);
            WorkerPool::new(1, move |i: u32| {
                if i == 0 {
                    panic!("boom");
                }
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        };

        pool.submit(0).unwrap();
        pool.submit(1).unwrap();
        pool.submit(2).unwrap();
        pool.shutdown();

        assert_eq!(done.load(Ordering::SeqCst), 2);
    }
}
