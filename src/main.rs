use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use sqlx::postgres::PgPoolOptions;
use tokio::signal::unix::{signal, SignalKind};

use log::{info, initialize_logger, warn};
use music_library::config::{get_variable, parse_variable};
use music_library::db::PgDb;
use music_library::details::HttpDetailsSource;
use music_library::environment::{Config, Environment};
use music_library::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = parse_variable("MUSIC_LIBRARY_PORT");
    let admin_port: u16 = parse_variable("MUSIC_LIBRARY_ADMIN_PORT");
    let config = Config::from_env();

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool..."; "timeout" => ?config.db_timeout);
    let connection_string = get_variable("MUSIC_LIBRARY_DB_CONNECTION_STRING");
    let pool = PgPoolOptions::new()
        .connect_timeout(config.db_timeout)
        .connect(&connection_string)
        .await
        .expect("create database pool from MUSIC_LIBRARY_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool, config.db_timeout));

    let details = Arc::new(HttpDetailsSource::new(
        config.external_api_url.clone(),
        config.details_timeout,
    )?);

    let shutdown_grace = config.shutdown_grace;
    let environment = Environment::new(logger.clone(), db, details, config);

    let mut sigterm = signal(SignalKind::terminate())?;
    let should_terminate = async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }
    .boxed()
    .shared();

    let main_server = {
        let (address, server) = warp::serve(routes::make_routes(environment))
            .try_bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), should_terminate.clone())?;

        info!(logger, "Listening..."; "address" => %address);
        server
    };

    let admin_server = {
        let (address, server) = warp::serve(routes::admin::make_healthz_route())
            .try_bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), should_terminate.clone())?;

        info!(logger, "Listening for admin requests..."; "address" => %address);
        server
    };

    let servers = async {
        tokio::join!(main_server, admin_server);
    };

    let grace_elapsed = async {
        should_terminate.await;
        info!(logger, "Shutting down..."; "grace_seconds" => shutdown_grace.as_secs());
        tokio::time::sleep(shutdown_grace).await;
    };

    tokio::select! {
        _ = servers => {
            info!(logger, "Exiting gracefully...");
        }
        _ = grace_elapsed => {
            warn!(logger, "Requests still running after grace period, exiting anyway");
        }
    }

    Ok(())
}
