//! Scoped acquisition of the host's global pointer listeners.
//!
//! While a drag or resize is running the host must deliver pointer-move and
//! pointer-up events from anywhere in the window, not just over the
//! component. A [`ListenerLease`] attaches those listeners when created and
//! detaches them when dropped, so pointer-up, controller teardown and
//! unwinding all release them.

use std::fmt;
use std::rc::Rc;

/// Opaque handle identifying one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// Host side of the global pointer listeners.
pub trait ListenerRegistry {
    /// Attach window-level pointer-move and pointer-up listeners.
    fn attach_pointer_listeners(&self) -> ListenerToken;

    /// Detach the listeners identified by `token`.
    fn detach_pointer_listeners(&self, token: ListenerToken);
}

/// Registry for hosts that always deliver pointer events to the editor.
#[derive(Debug, Default)]
pub struct NoopRegistry;

impl ListenerRegistry for NoopRegistry {
    fn attach_pointer_listeners(&self) -> ListenerToken {
        ListenerToken(0)
    }

    fn detach_pointer_listeners(&self, _token: ListenerToken) {}
}

/// Listeners held for the duration of one gesture.
pub struct ListenerLease {
    registry: Rc<dyn ListenerRegistry>,
    token: ListenerToken,
}

impl ListenerLease {
    pub fn acquire(registry: Rc<dyn ListenerRegistry>) -> Self {
        let token = registry.attach_pointer_listeners();
        log::debug!("pointer listeners attached ({token:?})");
        Self { registry, token }
    }

    pub fn token(&self) -> ListenerToken {
        self.token
    }
}

impl fmt::Debug for ListenerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerLease").field("token", &self.token).finish()
    }
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        self.registry.detach_pointer_listeners(self.token);
        log::debug!("pointer listeners detached ({:?})", self.token);
    }
}

/// Registry that counts live attachments.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CountingRegistry {
    live: std::cell::RefCell<std::collections::HashSet<u64>>,
    next: std::cell::Cell<u64>,
}

#[cfg(test)]
impl CountingRegistry {
    pub(crate) fn attached(&self) -> usize {
        self.live.borrow().len()
    }

    pub(crate) fn total_acquired(&self) -> u64 {
        self.next.get()
    }
}

#[cfg(test)]
impl ListenerRegistry for CountingRegistry {
    fn attach_pointer_listeners(&self) -> ListenerToken {
        let id = self.next.get() + 1;
        self.next.set(id);
        self.live.borrow_mut().insert(id);
        ListenerToken(id)
    }

    fn detach_pointer_listeners(&self, token: ListenerToken) {
        self.live.borrow_mut().remove(&token.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_detaches_on_drop() {
        let registry = Rc::new(CountingRegistry::default());
        let lease = ListenerLease::acquire(registry.clone());
        assert_eq!(registry.attached(), 1);
        assert_eq!(lease.token(), ListenerToken(1));
        drop(lease);
        assert_eq!(registry.attached(), 0);
    }

    #[test]
    fn test_lease_released_on_unwind() {
        let registry = Rc::new(CountingRegistry::default());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _lease = ListenerLease::acquire(registry.clone());
            panic!("view torn down");
        }));
        assert!(result.is_err());
        assert_eq!(registry.attached(), 0);
    }
}
