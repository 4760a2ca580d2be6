use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures::{pin_mut, Stream, TryStreamExt};
use log::{debug, error, Logger};
use warp::http::{Method, StatusCode};
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::LibraryError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

use rejection::{BodyRejection, FlattenedRejection};

pub use internal::*;

/// The largest request body to accept, in bytes.
pub const MAX_CONTENT_LENGTH: u64 = 1024 * 1024;

/// The path under which every route lives.
pub const LIBRARY_PATH: &str = "music-library";

/// Combines every route, turning rejections into JSON error responses
/// and logging each request.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();
    let request_logger = environment.logger.clone();

    let routes = make_add_route(environment.clone())
        .or(make_update_route(environment.clone()))
        .unify()
        .or(make_delete_route(environment.clone()))
        .unify()
        .or(make_lyrics_route(environment.clone()))
        .unify()
        .or(make_list_route(environment))
        .unify()
        .map(|reply: Box<dyn Reply>| Ok::<_, reject::Rejection>(reply))
        .or_else(|rejection: reject::Rejection| async move {
            Ok::<_, reject::Rejection>((Err(rejection),))
        });

    warp::method()
        .and(routes)
        .map(move |method: Method, result: Result<Box<dyn Reply>, reject::Rejection>| {
            match result {
                Ok(reply) => reply,
                Err(rejection) => {
                    Box::new(format_rejection(&logger, &method, rejection)) as Box<dyn Reply>
                }
            }
        })
        .with(warp::log::custom(move |info| {
            debug!(request_logger, "Handled request";
                "method" => %info.method(),
                "path" => info.path(),
                "status" => info.status().as_u16(),
                "elapsed_ms" => info.elapsed().as_secs_f64() * 1000.0);
        }))
}

pub fn format_rejection(
    logger: &Arc<Logger>,
    method: &Method,
    rej: reject::Rejection,
) -> WithStatus<Json> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let status = status_code_for(&r.error);

        if status.is_server_error() {
            error!(logger, "Library error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            debug!(logger, "Request failed"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        return with_status(json(&r.flatten()), status);
    }

    let (status, message) = if let Some(body) = rej.find::<BodyRejection>() {
        let message = match body {
            BodyRejection::TooLarge => {
                format!("body must not be larger than {} bytes", MAX_CONTENT_LENGTH)
            }
            BodyRejection::Unreadable => "body could not be read".to_owned(),
        };

        (StatusCode::BAD_REQUEST, message)
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "resource not found".to_owned())
    } else if rej.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            format!("the {} method is not supported for this resource", method),
        )
    } else {
        (StatusCode::BAD_REQUEST, "malformed request".to_owned())
    };

    debug!(logger, "Request rejected"; "status" => %status, "message" => &message, "rejection" => ?rej);

    with_status(json(&FlattenedRejection::message(message)), status)
}

/// Extracts the request body, failing once it grows past
/// [`MAX_CONTENT_LENGTH`]. Chunked bodies are accepted.
pub fn limited_body() -> impl Filter<Extract = (Bytes,), Error = reject::Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::body::stream())
        .and_then(read_limited)
}

async fn read_limited<S, B>(content_length: Option<u64>, stream: S) -> Result<Bytes, reject::Rejection>
where
    S: Stream<Item = Result<B, warp::Error>> + Send,
    B: Buf + Send,
{
    if content_length.map_or(false, |length| length > MAX_CONTENT_LENGTH) {
        return Err(reject::custom(BodyRejection::TooLarge));
    }

    pin_mut!(stream);

    let mut body = BytesMut::new();
    while let Some(chunk) = stream
        .try_next()
        .await
        .map_err(|_| reject::custom(BodyRejection::Unreadable))?
    {
        if (body.len() + chunk.remaining()) as u64 > MAX_CONTENT_LENGTH {
            return Err(reject::custom(BodyRejection::TooLarge));
        }

        body.put(chunk);
    }

    Ok(body.freeze())
}

fn status_code_for(e: &LibraryError) -> StatusCode {
    use LibraryError::*;

    match e {
        Validation(..) => StatusCode::UNPROCESSABLE_ENTITY,
        NotFound(..)
        | AlreadyExists
        | NoLyrics(..)
        | PageOverflow { .. }
        | InvalidPage { .. }
        | EmptyPage { .. }
        | MalformedBody(..) => StatusCode::BAD_REQUEST,
        Sqlx { .. } | Timeout(..) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, path as p, post, put, query};

    use super::{handlers, limited_body, query as q, LIBRARY_PATH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
        ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
        ($route_variable:ident; $first:expr, $($rest:expr),+) => (
            let $route_variable = $route_variable.and($first);
            route_filter!($route_variable; $($rest),+);
        )
    }

    macro_rules! route {
        ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
            pub fn $name(environment: Environment) -> Route {
                let $route_variable = warp::any()
                    .map(move || environment.clone())
                    .and(p(LIBRARY_PATH));

                route_filter!($route_variable; $($filters),+);

                $route_variable.and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    // methods are matched before bodies so that a wrong method is
    // reported as such
    route!(make_add_route => add, rt; p("song"), end(), post(), limited_body());
    route!(make_update_route => update, rt; p("song"), end(), put(), limited_body());
    route!(make_delete_route => delete, rt; p("song"), end(), delete(), query::<q::IdQuery>());
    route!(make_lyrics_route => lyrics, rt; p("lyrics"), end(), g(), query::<q::LyricsQuery>());
    route!(make_list_route => list, rt; p("list"), end(), g(), query::<q::ListQuery>());
}
