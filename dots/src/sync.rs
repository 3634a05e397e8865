use std::fmt;
use std::future::Future;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Uri, header};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;

use crate::cache::SessionEpoch;
use crate::geometry::Edge;
use crate::snapshot::{BoardSnapshot, SnapshotError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    Load,
    Reset,
    SubmitMove(Edge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: SessionEpoch,
    pub request: SyncRequest,
}

#[derive(Debug)]
pub enum SyncReply {
    Loaded(Result<BoardSnapshot, SyncError>),
    Reset(Result<(), SyncError>),
    Moved {
        edge: Edge,
        result: Result<BoardSnapshot, SyncError>,
    },
}

#[derive(Debug)]
pub struct Completion {
    pub epoch: SessionEpoch,
    pub reply: SyncReply,
}

#[derive(Debug)]
pub enum SyncError {
    InvalidUrl(String),
    Request(String),
    Transport(hyper_util::client::legacy::Error),
    Body(hyper::Error),
    /// The authority answered with a non-success status.
    Status { status: u16, body: String },
    Snapshot(SnapshotError),
    Encode(serde_json::Error),
    /// The background worker shut down before answering.
    WorkerGone,
}

impl SyncError {
    /// Human-readable reason, preferring the authority's `{"error": ...}` message.
    pub fn reason(&self) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }

        match self {
            SyncError::Status { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .map(|b| b.error)
                .unwrap_or_else(|_| self.to_string()),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::InvalidUrl(url) => write!(f, "invalid authority url {url:?}"),
            SyncError::Request(e) => write!(f, "failed building request: {e}"),
            SyncError::Transport(e) => write!(f, "request failed: {e}"),
            SyncError::Body(e) => write!(f, "failed reading response body: {e}"),
            SyncError::Status { status, body } => {
                write!(f, "authority answered {status}: {}", body.trim())
            }
            SyncError::Snapshot(e) => write!(f, "bad snapshot from authority: {e}"),
            SyncError::Encode(e) => write!(f, "failed encoding move: {e}"),
            SyncError::WorkerGone => write!(f, "sync worker stopped"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Transport(e) => Some(e),
            SyncError::Body(e) => Some(e),
            SyncError::Snapshot(e) => Some(e),
            SyncError::Encode(e) => Some(e),
            SyncError::InvalidUrl(_)
            | SyncError::Request(_)
            | SyncError::Status { .. }
            | SyncError::WorkerGone => None,
        }
    }
}

impl From<SnapshotError> for SyncError {
    fn from(e: SnapshotError) -> Self {
        SyncError::Snapshot(e)
    }
}

/// The remote owner of the game rules. Each call is a single round trip: no retries and no
/// client-side timeout.
pub trait GameAuthority {
    fn load(&self) -> impl Future<Output = Result<BoardSnapshot, SyncError>> + Send;

    fn reset(&self) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Accepted moves answer with the post-move snapshot; illegal ones with an error.
    fn submit_move(
        &self,
        edge: Edge,
    ) -> impl Future<Output = Result<BoardSnapshot, SyncError>> + Send;
}

pub async fn execute<A: GameAuthority>(authority: &A, ticket: Ticket) -> Completion {
    let reply = match ticket.request {
        SyncRequest::Load => SyncReply::Loaded(authority.load().await),
        SyncRequest::Reset => SyncReply::Reset(authority.reset().await),
        SyncRequest::SubmitMove(edge) => SyncReply::Moved {
            edge,
            result: authority.submit_move(edge).await,
        },
    };
    Completion {
        epoch: ticket.epoch,
        reply,
    }
}

/// JSON-over-HTTP/1 authority rooted at `{base_url}/api/game/{game_id}`.
#[derive(Clone)]
pub struct HttpAuthority {
    client: Client<HttpConnector, Full<Bytes>>,
    game_url: String,
}

impl HttpAuthority {
    /// Only plain `http://` bases are supported. Building needs no runtime; sending does.
    pub fn new(base_url: &str, game_id: &str) -> Result<Self, SyncError> {
        let game_url = format!("{}/api/game/{game_id}", base_url.trim_end_matches('/'));
        let uri: Uri = game_url
            .parse()
            .map_err(|_| SyncError::InvalidUrl(game_url.clone()))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(SyncError::InvalidUrl(game_url));
        }
        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { client, game_url })
    }

    pub fn game_url(&self) -> &str {
        &self.game_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, SyncError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{path}", self.game_url))
            .header(header::ACCEPT, "application/json");
        let body = match body {
            Some(bytes) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(bytes))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder
            .body(body)
            .map_err(|e| SyncError::Request(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(SyncError::Transport)?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(SyncError::Body)?
            .to_bytes();

        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }
}

impl GameAuthority for HttpAuthority {
    async fn load(&self) -> Result<BoardSnapshot, SyncError> {
        let bytes = self.send(Method::GET, "", None).await?;
        Ok(BoardSnapshot::from_json(&bytes)?)
    }

    async fn reset(&self) -> Result<(), SyncError> {
        self.send(Method::POST, "/reset", None).await?;
        Ok(())
    }

    async fn submit_move(&self, edge: Edge) -> Result<BoardSnapshot, SyncError> {
        let body = serde_json::to_vec(&edge).map_err(SyncError::Encode)?;
        let bytes = self.send(Method::POST, "/move", Some(body)).await?;
        Ok(BoardSnapshot::from_json(&bytes)?)
    }
}
