//! Minimal HTTP endpoint serving freshly generated worlds as PNG.
//!
//! `GET /?w=2048&h=1024&r=250&s=42` generates a world and answers with the
//! encoded image. Every connection serves a single request and is closed.

use std::num::ParseIntError;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use thiserror::Error;

use crate::export::{ExportError, OutputFormat};
use crate::world::{World, WorldConfig, WorldError};

/// Largest world a single request may ask for (4096x4096).
pub const MAX_REQUEST_TILES: usize = 4096 * 4096;

/// Largest region count a single request may ask for.
pub const MAX_REQUEST_REGIONS: usize = 1 << 16;

/// Bytes read for the request line and headers together.
pub const MAX_REQUEST_BYTES: u64 = 8 * 1024;

/// Errors produced while answering a request.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid value {value:?} for parameter '{name}': {source}")]
    BadParameter {
        name: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[error("{name} {value} exceeds the limit of {limit}")]
    TooLarge {
        name: &'static str,
        value: usize,
        limit: usize,
    },
    #[error("{0}")]
    World(#[from] WorldError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("generation task failed: {0}")]
    Task(String),
}

impl ServerError {
    fn status(&self) -> (u16, &'static str) {
        match self {
            ServerError::BadParameter { .. } | ServerError::TooLarge { .. } | ServerError::World(_) => {
                (400, "Bad Request")
            }
            _ => (500, "Internal Server Error"),
        }
    }
}

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn text(status: u16, reason: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            content_type: "text/plain; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason,
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Read `w`, `h`, `r` and `s` from a request target such as `/?w=64&s=3`.
/// Missing parameters take the defaults of [`WorldConfig::default`]. Worlds
/// above [`MAX_REQUEST_TILES`] or [`MAX_REQUEST_REGIONS`] are refused.
pub fn parse_query(target: &str) -> Result<WorldConfig, ServerError> {
    let mut config = WorldConfig::default();
    let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "w" => config.width = parse_param("w", value)?,
            "h" => config.height = parse_param("h", value)?,
            "r" => config.regions = parse_param("r", value)?,
            "s" => config.seed = parse_param("s", value)?,
            _ => log::debug!("Ignoring query parameter '{}'", key),
        }
    }

    check_limits(&config)?;
    Ok(config)
}

fn check_limits(config: &WorldConfig) -> Result<(), ServerError> {
    let tiles = config.width.saturating_mul(config.height);
    if tiles > MAX_REQUEST_TILES {
        return Err(ServerError::TooLarge {
            name: "tile count",
            value: tiles,
            limit: MAX_REQUEST_TILES,
        });
    }
    if config.regions > MAX_REQUEST_REGIONS {
        return Err(ServerError::TooLarge {
            name: "region count",
            value: config.regions,
            limit: MAX_REQUEST_REGIONS,
        });
    }
    Ok(())
}

fn parse_param<T>(name: &'static str, value: &str) -> Result<T, ServerError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value.parse().map_err(|source| ServerError::BadParameter {
        name,
        value: value.to_string(),
        source,
    })
}

/// Generate and encode a world as PNG.
pub fn render_png(config: &WorldConfig) -> Result<Vec<u8>, ServerError> {
    let world = World::generate(config)?;
    Ok(world.image().encode_to_vec(OutputFormat::Png)?)
}

/// Answer a request line such as `GET /?w=10 HTTP/1.1`.
pub async fn respond(request_line: &str) -> Response {
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method, target),
        _ => return Response::text(400, "Bad Request", "malformed request line"),
    };
    if method != "GET" {
        return Response::text(405, "Method Not Allowed", "only GET is supported");
    }

    let result = match parse_query(target) {
        Ok(config) => {
            log::info!(
                "Generating {}x{} world with {} regions, seed {}",
                config.width,
                config.height,
                config.regions,
                config.seed
            );
            tokio::task::spawn_blocking(move || render_png(&config))
                .await
                .unwrap_or_else(|e| Err(ServerError::Task(e.to_string())))
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(body) => Response {
            status: 200,
            reason: "OK",
            content_type: OutputFormat::Png.mime_type(),
            body,
        },
        Err(e) => {
            let (status, reason) = e.status();
            log::warn!("Request '{}' failed: {}", target, e);
            Response::text(status, reason, e.to_string())
        }
    }
}

async fn handle_connection(mut stream: TcpStream) -> Result<(), ServerError> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half.take(MAX_REQUEST_BYTES));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    if !request_line.ends_with('\n') {
        let response = Response::text(400, "Bad Request", "request line too long or incomplete");
        write_half.write_all(&response.to_bytes()).await?;
        write_half.shutdown().await?;
        return Ok(());
    }

    // Headers are not used, but must be consumed before replying.
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line.trim_end().is_empty() {
            break;
        }
    }

    let response = respond(request_line.trim_end()).await;
    write_half.write_all(&response.to_bytes()).await?;
    write_half.shutdown().await?;
    Ok(())
}

/// Accept connections on `listener` forever.
pub async fn serve_listener(listener: TcpListener) -> Result<(), ServerError> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream).await {
                log::warn!("Connection from {} failed: {}", peer, e);
            }
        });
    }
}

/// Bind `addr` and serve forever.
pub async fn serve(addr: &str) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    serve_listener(listener).await
}
