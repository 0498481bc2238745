//! Cooperative stop flag
//!
//! The flag lives outside the driver so an interrupt handler or another
//! task can raise it while an execute or refresh call holds `&mut` on the
//! driver. The engines poll it at step boundaries; a hold in progress always
//! runs to its end.

use portable_atomic::{AtomicBool, Ordering};

/// Stop request shared between a driver and whoever may cancel it
#[derive(Debug, Default)]
pub struct StopFlag {
    requested: AtomicBool,
}

impl StopFlag {
    /// Create a cleared flag
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Ask the running sequence to stop at its next checkpoint
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Clear a previous request
    ///
    /// Nothing clears the flag automatically; until this is called every
    /// checkpoint short-circuits.
    pub fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }

    /// Check if a stop has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
