//! Interrupt delivery.
//!
//! The process gets one `ctrlc` handler, installed on first use. It only
//! sets the pending-quit flag of whichever window registered last; the
//! window turns that into an [`Event::Quit`](crate::event::Event::Quit) on
//! its next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once, PoisonError, Weak};

static INSTALL: Once = Once::new();
static ACTIVE: Mutex<Weak<AtomicBool>> = Mutex::new(Weak::new());

/// Route interrupts to `flag` until it is unregistered or replaced.
pub(crate) fn register(flag: &Arc<AtomicBool>) {
    INSTALL.call_once(|| {
        if let Err(err) = ctrlc::set_handler(notify) {
            tracing::warn!(target: "stagehand::alert", %err, "interrupt handler not installed");
        }
    });
    *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(flag);
}

/// Stop routing interrupts to `flag`. Another window's registration is left alone.
pub(crate) fn unregister(flag: &Arc<AtomicBool>) {
    let mut active = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
    if std::ptr::eq(active.as_ptr(), Arc::as_ptr(flag)) {
        *active = Weak::new();
    }
}

/// Set the active window's pending-quit flag.
fn notify() {
    let active = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(flag) = active.upgrade() {
        flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_routes_to_registered_flag() {
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));

        register(&first);
        register(&second);
        notify();
        assert!(!first.load(Ordering::SeqCst));
        assert!(second.swap(false, Ordering::SeqCst));

        // Unregistering a stale flag keeps the current one
        unregister(&first);
        notify();
        assert!(second.swap(false, Ordering::SeqCst));

        unregister(&second);
        notify();
        assert!(!second.load(Ordering::SeqCst));
    }
}
