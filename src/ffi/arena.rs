//! Allocation region backing callback state handed to the engine.
//!
//! Raw `user_data` pointers registered with the C API point into boxes held
//! here. The arena pins those boxes at stable addresses for as long as it is
//! open, so the pointers stay valid across every callback invocation,
//! including ones arriving from engine worker threads. Owners declare the
//! arena *after* the handle to the C object using it, so the C object is
//! destroyed first and no callback can fire into freed state.

use std::any::Any;

pub struct Arena {
    slots: Vec<Box<dyn Any + Send + Sync>>,
    closed: bool,
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            closed: false,
        }
    }

    /// Moves `value` into the arena and returns the stable address of its
    /// heap allocation. The pointer stays valid until [`Arena::close`].
    ///
    /// Panics if the arena is already closed; adopting into a closed region
    /// is a bug in the owner, not a recoverable condition.
    pub fn adopt<T: Any + Send + Sync>(&mut self, value: T) -> *mut T {
        assert!(!self.is_closed(), "adopt on a closed arena");
        let mut boxed = Box::new(value);
        let ptr: *mut T = &mut *boxed;
        self.slots.push(boxed);
        ptr
    }

    /// Drops everything adopted so far. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        self.slots.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        self.close();
    }
}
