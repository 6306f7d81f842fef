//! Global async runtime
//!
//! The command boundary is synchronous while the library's generation-backed
//! actions are async. Handlers bridge the two with [`block_on`].

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global shared Tokio runtime, built on first use
pub static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("orangepad-rt")
        .build()
        .expect("Failed to create Tokio runtime")
});

/// Run a future to completion, blocking the current thread
///
/// Must not be called from inside the runtime itself.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
