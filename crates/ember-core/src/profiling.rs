//! Profiling utilities based on the `puffin` crate.
//!
//! Scoped timings are recorded with [`profile_function`] and [`profile_scope`];
//! they cost almost nothing until scopes are switched on.

pub use puffin::{profile_function, profile_scope};

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Record scopes in-process only.
    InProcess,
    /// Serve scopes to `puffin_viewer` over HTTP.
    #[cfg(feature = "profiling")]
    PuffinHttp,
}

#[cfg(feature = "profiling")]
static PROFILING_SERVER: std::sync::OnceLock<puffin_http::Server> = std::sync::OnceLock::new();

/// Address used by the puffin HTTP server.
pub const PUFFIN_ADDR: &str = "0.0.0.0:8585";

/// Switches profiling scopes on and starts the selected backend.
pub fn init_profiling(backend: ProfilingBackend) {
    puffin::set_scopes_on(true);
    match backend {
        ProfilingBackend::InProcess => {
            tracing::debug!("puffin scopes enabled");
        }
        #[cfg(feature = "profiling")]
        ProfilingBackend::PuffinHttp => match puffin_http::Server::new(PUFFIN_ADDR) {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://{}", PUFFIN_ADDR);
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        },
    }
}

/// Marks a frame boundary. Call once per game-loop iteration.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
