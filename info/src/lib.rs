//! Build information reported by `/healthz` and attached to every log
//! record.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The VCS revision the service was built from, if the build set
/// `MUSIC_LIBRARY_REVISION`.
pub const REVISION: Option<&str> = option_env!("MUSIC_LIBRARY_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
