use std::sync::{Mutex, MutexGuard};
use tokio::runtime::Runtime;

/// Creates a lightweight single-threaded Tokio runtime
///
/// Worker threads (audio thread, stream readers) each own one of these
/// instead of sharing a multi-threaded runtime.
pub fn create_runtime() -> crate::error::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Locks a mutex, recovering the inner value if a previous holder panicked
///
/// Player state is always safe to read after a panic: every field is
/// overwritten on the next tick.
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> Option<MutexGuard<'a, T>> {
    match mutex.lock() {
        Ok(guard) => Some(guard),
        Err(poisoned) => {
            log::warn!("[{}] Mutex poisoned, recovering from panic", context);
            Some(poisoned.into_inner())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn recovers_poisoned_mutex() {
        let shared = Arc::new(Mutex::new(7));
        let poisoner = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(shared.is_poisoned());
        let guard = safe_lock(&shared, "Test").unwrap();
        assert_eq!(*guard, 7);
    }

    #[test]
    fn runtime_runs_futures() {
        let rt = create_runtime().unwrap();
        assert_eq!(rt.block_on(async { 2 + 2 }), 4);
    }
}
