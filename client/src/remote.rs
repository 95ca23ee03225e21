//! REST access to the rooms database.
//!
//! Every room lives at `{base}/rooms/{code}.json`; single fields are addressed
//! as `{base}/rooms/{code}/{path}.json`. This is the Firebase Realtime
//! Database REST layout, which `lobby-server` mirrors for local play.

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use shared::RoomDocument;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("{method} {url} failed: {source}")]
    Http {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed room data from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The operations the room host needs from the database.
#[allow(async_fn_in_trait)]
pub trait RoomStore {
    /// Writes the whole room document.
    async fn create_room(&self, code: &str, payload: &Value) -> Result<(), RoomError>;

    /// Reads the room. `Ok(None)` when the database has nothing at that path.
    async fn fetch_room(&self, code: &str) -> Result<Option<RoomDocument>, RoomError>;

    /// Overwrites one field (or subtree) of the room.
    async fn write_field(&self, code: &str, path: &str, value: &Value) -> Result<(), RoomError>;

    async fn delete_room(&self, code: &str) -> Result<(), RoomError>;
}

#[derive(Deserialize)]
struct PushReply {
    name: String,
}

/// HTTP implementation of [`RoomStore`].
#[derive(Debug, Clone)]
pub struct RemoteRooms {
    http: Client,
    base_url: String,
}

impl RemoteRooms {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn room_url(&self, code: &str) -> String {
        format!("{}/rooms/{}.json", self.base_url, code)
    }

    pub fn field_url(&self, code: &str, path: &str) -> String {
        format!("{}/rooms/{}/{}.json", self.base_url, code, path.trim_matches('/'))
    }

    /// Appends `value` under `path` with a database generated key and returns the key.
    pub async fn push(&self, code: &str, path: &str, value: &Value) -> Result<String, RoomError> {
        let url = self.field_url(code, path);
        let response = send("POST", &url, self.http.post(&url).json(value)).await?;
        let body = read_body("POST", &url, response).await?;
        let reply: PushReply = decode(&url, &body)?;
        Ok(reply.name)
    }

    /// Merges the children of `value` into the object at `path`.
    pub async fn update(&self, code: &str, path: &str, value: &Value) -> Result<(), RoomError> {
        let url = self.field_url(code, path);
        send("PATCH", &url, self.http.patch(&url).json(value)).await?;
        Ok(())
    }
}

impl RoomStore for RemoteRooms {
    async fn create_room(&self, code: &str, payload: &Value) -> Result<(), RoomError> {
        let url = self.room_url(code);
        send("PUT", &url, self.http.put(&url).json(payload)).await?;
        Ok(())
    }

    async fn fetch_room(&self, code: &str) -> Result<Option<RoomDocument>, RoomError> {
        let url = self.room_url(code);
        let response = send("GET", &url, self.http.get(&url)).await?;
        let body = read_body("GET", &url, response).await?;
        decode(&url, &body)
    }

    async fn write_field(&self, code: &str, path: &str, value: &Value) -> Result<(), RoomError> {
        let url = self.field_url(code, path);
        send("PUT", &url, self.http.put(&url).json(value)).await?;
        Ok(())
    }

    async fn delete_room(&self, code: &str) -> Result<(), RoomError> {
        let url = self.room_url(code);
        send("DELETE", &url, self.http.delete(&url)).await?;
        Ok(())
    }
}

async fn send(method: &'static str, url: &str, request: RequestBuilder) -> Result<Response, RoomError> {
    debug!("🌐 {} {}", method, url);
    request
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(|source| RoomError::Http {
            method,
            url: url.to_string(),
            source,
        })
}

async fn read_body(method: &'static str, url: &str, response: Response) -> Result<String, RoomError> {
    response.text().await.map_err(|source| RoomError::Http {
        method,
        url: url.to_string(),
        source,
    })
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, body: &str) -> Result<T, RoomError> {
    serde_json::from_str(body).map_err(|source| RoomError::Decode {
        url: url.to_string(),
        source,
    })
}
