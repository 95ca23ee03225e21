use std::convert::Infallible;

use serde_json::{json, Value};
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::path::Tail;
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::database::Db;

/// Parses a request path such as `rooms/ABCD/gameState.json` into its keys.
pub fn parse_path(tail: &str) -> Result<Vec<String>, String> {
    let Some(stem) = tail.strip_suffix(".json") else {
        return Err(format!("'/{}' is not a .json path", tail));
    };
    Ok(stem
        .split('/')
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect())
}

/// All database routes: `GET|PUT|POST|PATCH|DELETE /{path}.json` plus `GET /health`.
pub fn routes(db: Db) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let read = warp::get()
        .and(warp::path::tail())
        .and(with_db(db.clone()))
        .and_then(handle_get);

    let write = warp::put()
        .and(warp::path::tail())
        .and(warp::body::json())
        .and(with_db(db.clone()))
        .and_then(handle_put);

    let push = warp::post()
        .and(warp::path::tail())
        .and(warp::body::json())
        .and(with_db(db.clone()))
        .and_then(handle_post);

    let merge = warp::patch()
        .and(warp::path::tail())
        .and(warp::body::json())
        .and(with_db(db.clone()))
        .and_then(handle_patch);

    let remove = warp::delete()
        .and(warp::path::tail())
        .and(with_db(db))
        .and_then(handle_delete);

    health.or(read).or(write).or(push).or(merge).or(remove)
}

fn with_db(db: Db) -> impl Filter<Extract = (Db,), Error = Infallible> + Clone {
    warp::any().map(move || db.clone())
}

fn bad_request(message: String) -> Response {
    warn!("❌ {}", message);
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), StatusCode::BAD_REQUEST)
        .into_response()
}

async fn handle_get(tail: Tail, db: Db) -> Result<Response, Infallible> {
    Ok(match parse_path(tail.as_str()) {
        Ok(path) => warp::reply::json(&db.get(&path)).into_response(),
        Err(message) => bad_request(message),
    })
}

async fn handle_put(tail: Tail, body: Value, db: Db) -> Result<Response, Infallible> {
    let path = match parse_path(tail.as_str()) {
        Ok(path) => path,
        Err(message) => return Ok(bad_request(message)),
    };
    info!("📝 PUT /{}", path.join("/"));
    db.set(&path, body.clone());
    Ok(warp::reply::json(&body).into_response())
}

async fn handle_post(tail: Tail, body: Value, db: Db) -> Result<Response, Infallible> {
    let path = match parse_path(tail.as_str()) {
        Ok(path) => path,
        Err(message) => return Ok(bad_request(message)),
    };
    let key = db.push(&path, body);
    info!("➕ POST /{} -> {}", path.join("/"), key);
    Ok(warp::reply::json(&json!({ "name": key })).into_response())
}

async fn handle_patch(tail: Tail, body: Value, db: Db) -> Result<Response, Infallible> {
    let path = match parse_path(tail.as_str()) {
        Ok(path) => path,
        Err(message) => return Ok(bad_request(message)),
    };
    let Value::Object(children) = body else {
        return Ok(bad_request("PATCH body must be a JSON object".to_string()));
    };
    info!("🩹 PATCH /{}", path.join("/"));
    db.update(&path, children.clone());
    Ok(warp::reply::json(&Value::Object(children)).into_response())
}

async fn handle_delete(tail: Tail, db: Db) -> Result<Response, Infallible> {
    let path = match parse_path(tail.as_str()) {
        Ok(path) => path,
        Err(message) => return Ok(bad_request(message)),
    };
    info!("🗑️ DELETE /{}", path.join("/"));
    db.remove(&path);
    Ok(warp::reply::json(&Value::Null).into_response())
}
