//! Exit codes for the CLI

use hydra_core::HydraError;

/// Success (unit failures included unless `--strict`)
pub const SUCCESS: i32 = 0;

/// General error, including discovery failures
pub const ERROR: i32 = 1;

/// At least one unit failed and `--strict` was given
pub const UNITS_FAILED: i32 = 3;

/// Configuration error (`EX_CONFIG`); 2 is left to clap for usage errors
pub const CONFIG_ERROR: i32 = 78;

/// Map a top-level error to its exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<HydraError>() {
        Some(e) if e.is_config() => CONFIG_ERROR,
        _ => ERROR,
    }
}
