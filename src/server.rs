use crate::config::ServerConfig;
use crate::turn::{CredentialQuery, CredentialResponse, Outcome, TurnCredentialsHandler};
use crate::utils::Result;
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::http::header::CONTENT_TYPE;
use warp::http::StatusCode;
use warp::reject;
use warp::{Filter, Rejection, Reply};

pub async fn serve(handler: Arc<TurnCredentialsHandler>, config: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.http_port).parse()?;
    let routes = routes(handler, &config.credentials_path);

    info!(
        "TURN credentials endpoint listening on http://{}/{}",
        addr,
        config.credentials_path.trim_matches('/')
    );
    warp::serve(routes).run(addr).await;

    Ok(())
}

/// The credentials endpoint mounted at `path`, with issuance failures mapped to 500.
pub fn routes(
    handler: Arc<TurnCredentialsHandler>,
    path: &str,
) -> impl Filter<Extract = (warp::reply::Response,), Error = Rejection> + Clone {
    at_path(path)
        .and(credentials_filter(handler))
        .recover(handle_rejection)
        .unify()
}

/// Answers GET requests with credentials. Requests the handler passes on are
/// rejected as not found so the next filter in an `or` chain gets them.
///
/// Query parameters go through a plain map: a repeated key keeps its last
/// value instead of failing the request.
pub fn credentials_filter(
    handler: Arc<TurnCredentialsHandler>,
) -> impl Filter<Extract = (warp::reply::Response,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::query::<HashMap<String, String>>())
        .and(with_handler(handler))
        .and_then(issue_credentials)
}

async fn issue_credentials(
    params: HashMap<String, String>,
    handler: Arc<TurnCredentialsHandler>,
) -> std::result::Result<warp::reply::Response, Rejection> {
    match handler.handle(&CredentialQuery::from(params)) {
        Outcome::Handled(response) => Ok(into_reply(response)),
        Outcome::NotHandled => Err(reject::not_found()),
        Outcome::Failed(e) => {
            error!("Failed to issue TURN credentials: {}", e);
            Err(reject::custom(CredentialFailure(e.to_string())))
        }
    }
}

fn into_reply(response: CredentialResponse) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::with_header(response.body, CONTENT_TYPE, response.content_type),
        response.status,
    )
    .into_response()
}

#[derive(Debug)]
struct CredentialFailure(String);

impl reject::Reject for CredentialFailure {}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Turns issuance failures into a 500; every other rejection is passed on untouched.
pub async fn handle_rejection(
    err: Rejection,
) -> std::result::Result<warp::reply::Response, Rejection> {
    if err.find::<CredentialFailure>().is_some() {
        let body = warp::reply::json(&ErrorBody {
            error: "failed to issue TURN credentials",
        });
        return Ok(warp::reply::with_status(body, StatusCode::INTERNAL_SERVER_ERROR).into_response());
    }
    Err(err)
}

/// Matches `path` exactly; `"api/turn"` mounts at `/api/turn`, `""` at `/`.
fn at_path(path: &str) -> BoxedFilter<()> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(warp::any().boxed(), |route, segment| {
            route.and(warp::path(segment.to_string())).boxed()
        })
        .and(warp::path::end())
        .boxed()
}

fn with_handler(
    handler: Arc<TurnCredentialsHandler>,
) -> impl Filter<Extract = (Arc<TurnCredentialsHandler>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || handler.clone())
}
