use crate::{assets::Query, resolver::Resolver};
use axum::{
    extract::{Path, Request, State},
    http::{header::LOCATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::{debug, error, info};
use std::{future::Future, io, time::Instant};
use tokio::net::TcpListener;

pub(crate) const NOT_FOUND_BODY: &str = "Couldn't find an asset";

/// Builds the router for `GET /{owner}/{repo}/{format}/{architecture}`. A matching asset gets a
/// `302` to its download URL, no match gets a `404`, and a failure talking to the upstream API gets
/// a `500` with the error in the body.
pub fn router(resolver: Resolver) -> Router {
    Router::new()
        .route(
            "/{owner}/{repo}/{format}/{architecture}",
            get(redirect_to_asset),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(resolver)
}

/// Serves the router on `listener` until `shutdown` completes. Requests that are in flight when
/// that happens are allowed to finish.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve<F>(listener: TcpListener, resolver: Resolver, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown)
        .await
}

// If the client goes away, axum drops this future, which drops the upstream request along with
// its connection.
async fn redirect_to_asset(
    State(resolver): State<Resolver>,
    Path(query): Path<Query>,
) -> Response {
    match resolver.resolve(&query).await {
        Ok(Some(asset)) => {
            debug!("redirecting to {}", asset.url);
            // This is the `Url` serialization of what GitHub sent, so the host is lower-cased and
            // an empty path becomes `/`.
            (StatusCode::FOUND, [(LOCATION, asset.url.as_str())]).into_response()
        }
        Ok(None) => {
            debug!(
                "no {} asset for {} in {}",
                query.format,
                query.architecture,
                query.project_name(),
            );
            (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
        }
        Err(e) => {
            let e = anyhow::Error::new(e);
            error!("{e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("error: {e:#}")).into_response()
        }
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let resp = next.run(req).await;

    info!(
        "{method} {path} {} {:?}",
        resp.status().as_u16(),
        started.elapsed(),
    );
    resp
}
