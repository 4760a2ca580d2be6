pub mod config;
pub mod dates;
pub mod db;
pub mod details;
pub mod enrichment;
pub mod environment;
pub mod errors;
pub mod pagination;
pub mod routes;
pub mod song;
pub mod validation;
