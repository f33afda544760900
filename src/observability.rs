//! Diagnostics for the codec drivers.
//!
//! The `log_metric!` macro emits key-value metric lines the benchmarking
//! harness scrapes from stdout. Metric emission is gated on
//! `debug_assertions`, so release builds carry no trace of it.
//!
//! Regular diagnostics go through the `log` facade; `init_logging` wires up
//! `env_logger` for callers that want them on stderr.

/// Logs a structured key-value metric line to stdout, only in debug builds.
///
/// ```
/// use complab::log_metric;
/// let ratio = 2.4;
/// log_metric!("algorithm" = "range", "ratio" = &ratio);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let entries = [$(format!("\"{}\": \"{}\"", $key, $value)),+];
            println!("COMPLAB_METRIC: {{ {} }}", entries.join(", "));
        }
    };
}

/// Initializes `env_logger` with the standard `RUST_LOG` environment filter.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
