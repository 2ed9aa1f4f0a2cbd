//! Sticky per-context error code.

use std::cell::Cell;

use tracing::trace;

use crate::constants::NO_ERROR;
use crate::driver::GlDriver;

/// The context's pending WebGL error.
///
/// The first error posted wins until it is read; reading also drains the
/// driver's native queue.
#[derive(Debug)]
pub struct ErrorChannel {
    code: Cell<u32>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self {
            code: Cell::new(NO_ERROR),
        }
    }

    /// Post an error. Ignored while another error is pending.
    pub fn set(&self, code: u32) {
        if self.code.get() == NO_ERROR {
            trace!(code, "Error posted");
            self.code.set(code);
        }
    }

    /// Pending code without clearing it.
    pub fn current(&self) -> u32 {
        self.code.get()
    }

    /// Read and clear. The driver queue is drained in full (at most
    /// `drain_limit` reads); the sticky code takes priority over the first
    /// native code.
    pub fn take(&self, driver: &dyn GlDriver, drain_limit: usize) -> u32 {
        let mut native = NO_ERROR;
        for _ in 0..drain_limit {
            let code = driver.get_error();
            if code == NO_ERROR {
                break;
            }
            if native == NO_ERROR {
                native = code;
            }
        }

        let sticky = self.code.replace(NO_ERROR);
        if sticky != NO_ERROR {
            sticky
        } else {
            native
        }
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}
