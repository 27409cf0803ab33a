//! Connection Handler
//!
//! Serves one client connection: looks the request up in the shared cache,
//! answers hits directly, and forwards misses to the origin while capturing
//! the response for insertion.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::ProxyError;
use crate::proxy::capture::CaptureBuffer;
use crate::proxy::request::{build_origin_request, header_value, RequestLine, Target};
use crate::proxy::response::error_page;

/// Longest accepted request or header line, in bytes.
const MAX_LINE: usize = 8192;

/// Most header lines accepted in one request.
const MAX_HEADERS: usize = 100;

/// Read size when relaying origin responses.
const CHUNK_SIZE: usize = 8192;

// == Proxy Context ==
/// Everything a worker needs besides its connection.
#[derive(Debug, Clone)]
pub struct ProxyContext {
    /// The process-wide cache
    pub cache: Arc<CacheStore>,
    /// Largest response captured for caching
    pub max_object_size: usize,
    /// Limit on establishing an origin connection
    pub upstream_timeout: Duration,
}

impl ProxyContext {
    pub fn new(cache: Arc<CacheStore>, max_object_size: usize, upstream_timeout: Duration) -> Self {
        Self {
            cache,
            max_object_size,
            upstream_timeout,
        }
    }

    /// Builds a context around `cache` using the configured limits.
    pub fn from_config(cache: Arc<CacheStore>, config: &Config) -> Self {
        Self::new(
            cache,
            config.max_object_size,
            Duration::from_secs(config.upstream_timeout),
        )
    }
}

// == Handle Client ==
/// Serves a single request on `stream`, then closes it.
///
/// Requests the proxy refuses are answered with an HTML error page. Only
/// stream failures are returned as errors.
pub async fn handle_client<S>(stream: S, ctx: &ProxyContext) -> Result<(), ProxyError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    if let Err(err) = serve_request(&mut reader, &mut writer, ctx).await {
        let Some((status, reason)) = err.status() else {
            return Err(err);
        };
        warn!(error = %err, status, "refusing request");
        writer
            .write_all(&error_page(status, reason, &err.to_string()))
            .await?;
    }

    writer.shutdown().await?;
    Ok(())
}

async fn serve_request<R, W>(reader: &mut R, writer: &mut W, ctx: &ProxyContext) -> Result<(), ProxyError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(line) = read_line(reader).await? else {
        debug!("client closed before sending a request");
        return Ok(());
    };

    let request = RequestLine::parse(&line)?;
    if !request.is_get() {
        return Err(ProxyError::NotImplemented(request.method));
    }

    let headers = read_headers(reader).await?;
    let target = Target::parse(&request.uri, header_value(&headers, "Host"))?;
    let key = target.cache_key();

    if let Some(payload) = ctx.cache.lookup(&key) {
        info!(key = %key, size = payload.len(), "cache hit");
        writer.write_all(&payload).await?;
        writer.flush().await?;
        return Ok(());
    }

    info!(key = %key, "cache miss, forwarding to origin");
    let mut origin = connect_origin(&target, ctx.upstream_timeout).await?;
    origin
        .write_all(build_origin_request(&target, &headers).as_bytes())
        .await?;

    let mut capture = CaptureBuffer::new(ctx.max_object_size);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = origin.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n]).await?;
        capture.push(&chunk[..n]);
    }
    writer.flush().await?;

    match capture.into_cacheable() {
        Some(body) => match ctx.cache.insert(key.as_str(), &body) {
            Ok(()) => debug!(key = %key, size = body.len(), "cached response"),
            Err(err) => debug!(key = %key, error = %err, "response not cached"),
        },
        None => debug!(
            key = %key,
            limit = ctx.max_object_size,
            "response exceeds object size limit, not cached"
        ),
    }

    Ok(())
}

async fn connect_origin(target: &Target, timeout: Duration) -> Result<TcpStream, ProxyError> {
    let connect = TcpStream::connect((target.connect_host(), target.port));
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(ProxyError::Upstream {
            host: target.host.clone(),
            port: target.port,
            source,
        }),
        Err(_) => Err(ProxyError::UpstreamTimeout {
            host: target.host.clone(),
            port: target.port,
        }),
    }
}

/// Reads one line, or None at end of stream.
async fn read_line<R>(reader: &mut R) -> Result<Option<String>, ProxyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    let n = reader
        .take(MAX_LINE as u64)
        .read_until(b'\n', &mut raw)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if n == MAX_LINE && !raw.ends_with(b"\n") {
        return Err(ProxyError::BadRequest(format!(
            "line longer than {MAX_LINE} bytes"
        )));
    }
    String::from_utf8(raw)
        .map(Some)
        .map_err(|_| ProxyError::BadRequest("request is not valid UTF-8".to_string()))
}

/// Reads header lines up to the blank line, with line endings stripped.
async fn read_headers<R>(reader: &mut R) -> Result<Vec<String>, ProxyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Vec::new();
    while let Some(line) = read_line(reader).await? {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if headers.len() == MAX_HEADERS {
            return Err(ProxyError::BadRequest(format!(
                "more than {MAX_HEADERS} header lines"
            )));
        }
        headers.push(line.to_string());
    }
    Ok(headers)
}
