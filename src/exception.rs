//! Process-wide sink for failures raised inside event callbacks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::Error;

pub type ExceptionHandler = Arc<dyn Fn(&Error) + Send + Sync>;

static HANDLER: RwLock<Option<ExceptionHandler>> = parking_lot::const_rwlock(None);

/// Install the handler that receives every callback failure. Only one handler
/// exists per process; registering again replaces the previous one.
pub fn register_exception_handler(handler: impl Fn(&Error) + Send + Sync + 'static) {
    *HANDLER.write() = Some(Arc::new(handler));
}

/// Remove the registered handler. Failures are logged afterwards.
pub fn clear_exception_handler() {
    HANDLER.write().take();
}

pub(crate) fn report(error: Error) {
    let handler = HANDLER.read().clone();

    match handler {
        Some(handler) => {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler(&error))) {
                log::error!(
                    "Exception handler panicked ({}) while handling: {}",
                    panic_message(panic.as_ref()),
                    error
                );
            }
        }
        None => log::error!("Unhandled callback failure: {}", error),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "callback panicked".to_string()
    }
}
