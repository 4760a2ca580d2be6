use std::sync::Arc;
use std::time::Duration;

use log::Logger;

use crate::config::{get_variable, parse_optional_variable, parse_variable};
use crate::db::Db;
use crate::details::DetailsSource;

pub type SafeDb = dyn Db + Send + Sync;
pub type SafeDetailsSource = dyn DetailsSource + Send + Sync;

/// Everything a handler needs.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<SafeDb>,
    pub details: Arc<SafeDetailsSource>,
    pub config: Arc<Config>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<SafeDb>,
        details: Arc<SafeDetailsSource>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            details,
            config: Arc::new(config),
        }
    }
}

/// Maximum byte lengths of song attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_group_name_len: usize,
    pub max_song_name_len: usize,
    pub max_song_lyrics_len: usize,
    pub max_song_link_len: usize,
}

impl Limits {
    pub fn from_env() -> Self {
        Limits {
            max_group_name_len: parse_variable("MUSIC_LIBRARY_MAX_GROUP_NAME_LEN"),
            max_song_name_len: parse_variable("MUSIC_LIBRARY_MAX_SONG_NAME_LEN"),
            max_song_lyrics_len: parse_variable("MUSIC_LIBRARY_MAX_SONG_LYRICS_LEN"),
            max_song_link_len: parse_variable("MUSIC_LIBRARY_MAX_SONG_LINK_LEN"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub limits: Limits,

    /// Base URL of the song details API.
    pub external_api_url: String,

    pub db_timeout: Duration,
    pub details_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Config {
    pub const DEFAULT_DB_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DEFAULT_DETAILS_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

    pub fn new(limits: Limits, external_api_url: impl Into<String>) -> Self {
        Self {
            limits,
            external_api_url: external_api_url.into(),
            db_timeout: Self::DEFAULT_DB_TIMEOUT,
            details_timeout: Self::DEFAULT_DETAILS_TIMEOUT,
            shutdown_grace: Self::DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Reads the configuration from `MUSIC_LIBRARY_*` variables,
    /// panicking if a required one is missing or malformed.
    pub fn from_env() -> Self {
        let seconds = |name: &str, default: Duration| {
            Duration::from_secs(parse_optional_variable(name, default.as_secs()))
        };

        Self {
            limits: Limits::from_env(),
            external_api_url: get_variable("MUSIC_LIBRARY_EXTERNAL_API_URL"),
            db_timeout: seconds("MUSIC_LIBRARY_DB_TIMEOUT_SECONDS", Self::DEFAULT_DB_TIMEOUT),
            details_timeout: seconds(
                "MUSIC_LIBRARY_DETAILS_TIMEOUT_SECONDS",
                Self::DEFAULT_DETAILS_TIMEOUT,
            ),
            shutdown_grace: seconds(
                "MUSIC_LIBRARY_SHUTDOWN_GRACE_SECONDS",
                Self::DEFAULT_SHUTDOWN_GRACE,
            ),
        }
    }
}
