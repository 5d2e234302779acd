//! # Cola de Conexiones
//! src/workers/queue.rs
//!
//! Cola FIFO thread-safe sin límite de capacidad, con cierre.
//!
//! - `push` nunca bloquea; falla sólo si la cola ya está cerrada.
//! - `pop` bloquea mientras la cola esté vacía y abierta. Una vez cerrada
//!   sigue entregando lo encolado y recién retorna `None` cuando se vacía.
//!
//! El `pop` saca el elemento bajo el mismo lock con el que chequea la
//! condición, así que cada elemento lo recibe exactamente un consumidor.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO compartida entre el listener y los workers
pub struct ConnectionQueue<T> {
    state: Arc<Mutex<QueueState<T>>>,

    /// Condvar para despertar workers cuando hay trabajo o se cierra
    condvar: Arc<Condvar>,
}

impl<T> ConnectionQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            })),
            condvar: Arc::new(Condvar::new()),
        }
    }

    // Un worker que entró en pánico no debe dejar la cola inutilizable
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Encola un elemento
    ///
    /// Si la cola está cerrada devuelve el elemento en el `Err`.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.lock();
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);

        // Notificar a un worker esperando
        self.condvar.notify_one();
        Ok(())
    }

    /// Desencola el elemento más antiguo
    ///
    /// Bloquea hasta que haya un elemento o la cola se cierre y se vacíe.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();

        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }

            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Cierra la cola y despierta a todos los workers en espera
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.condvar.notify_all();
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl<T> Default for ConnectionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ConnectionQueue<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            condvar: Arc::clone(&self.condvar),
        }
    }
}
