//! Registry of callbacks run when the tool shuts down.
//!
//! The registry is owned by the caller (the CLI) and handed to whoever needs
//! to react to shutdown, instead of living in global state. Each registration
//! returns a [`HookId`] so the owner can withdraw it once the resource it
//! guards is gone. Firing drains the table, so every hook runs at most once.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Hook = Box<dyn FnOnce() -> HookFuture + Send>;

/// Handle for a registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

#[derive(Default)]
struct HookTable {
    next_id: u64,
    hooks: Vec<(HookId, Hook)>,
}

/// Cloneable shutdown hook registry; clones share one table.
#[derive(Clone, Default)]
pub struct ShutdownHooks {
    table: Arc<Mutex<HookTable>>,
}

impl std::fmt::Debug for ShutdownHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHooks")
            .field("registered", &self.len())
            .finish()
    }
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async callback.
    pub fn register<F, Fut>(&self, hook: F) -> HookId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut table = self.lock();
        let id = HookId(table.next_id);
        table.next_id += 1;
        table
            .hooks
            .push((id, Box::new(move || Box::pin(hook()) as HookFuture)));
        debug!(hook = id.0, "Shutdown hook registered");
        id
    }

    /// Remove a hook. Returns `false` if it already ran or was removed.
    pub fn deregister(&self, id: HookId) -> bool {
        let mut table = self.lock();
        let before = table.hooks.len();
        table.hooks.retain(|(hook_id, _)| *hook_id != id);
        let removed = table.hooks.len() != before;
        if removed {
            debug!(hook = id.0, "Shutdown hook deregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every registered hook once, in registration order.
    pub async fn fire(&self) {
        let hooks = std::mem::take(&mut self.lock().hooks);
        if hooks.is_empty() {
            return;
        }
        info!(count = hooks.len(), "Running shutdown hooks");
        for (_, hook) in hooks {
            hook().await;
        }
    }

    /// Fire the registry when the process receives Ctrl-C.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        let hooks = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, shutting down");
                    hooks.fire().await;
                }
                Err(e) => warn!(error = %e, "Cannot listen for interrupt signal"),
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HookTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(hooks: &ShutdownHooks, counter: &Arc<AtomicUsize>) -> HookId {
        let counter = Arc::clone(counter);
        hooks.register(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_fire_runs_each_hook_once() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        counting(&hooks, &counter);
        counting(&hooks, &counter);

        hooks.fire().await;
        hooks.fire().await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(hooks.is_empty());
    }

    #[tokio::test]
    async fn test_deregistered_hook_does_not_run() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = counting(&hooks, &counter);

        assert!(hooks.deregister(id));
        assert!(!hooks.deregister(id));
        hooks.fire().await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clones_share_the_table() {
        let hooks = ShutdownHooks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        counting(&hooks.clone(), &counter);

        assert_eq!(hooks.len(), 1);
        hooks.clone().fire().await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hooks_run_in_registration_order() {
        let hooks = ShutdownHooks::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            hooks.register(move || async move {
                order.lock().unwrap().push(i);
            });
        }

        hooks.fire().await;

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }
}
