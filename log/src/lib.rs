//! Structured logging for the music library service.
//!
//! Every crate in the workspace logs through the `slog` macros
//! re-exported here, so a single root logger built by
//! [`initialize_logger`] carries the build information onto each record.
//! Records are written as JSON lines to stderr. With the `env_logging`
//! feature, `RUST_LOG` filters them by module and level first.

use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root JSON logger, writing to stderr through an
/// asynchronous drain.
///
/// Records logged shortly before the returned logger (and all its
/// children) are dropped may be lost, since the drain flushes on a
/// background thread.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain).ignore_res();

    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}
