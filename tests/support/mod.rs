#![allow(dead_code)]

pub mod socket_guard;
pub mod stub;

/// Routes crate diagnostics to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
