//! Request Parsing
//!
//! Request-line parsing, URI decomposition into host/port/path, and the
//! header rewrite applied to requests forwarded to origin servers.

use crate::error::ProxyError;

/// User-Agent sent to every origin server.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// Port used when the URI does not name one.
pub const DEFAULT_PORT: u16 = 80;

/// Headers the proxy always writes itself.
const REPLACED_HEADERS: [&str; 4] = ["host", "user-agent", "connection", "proxy-connection"];

// == Request Line ==
/// `METHOD URI VERSION` as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub uri: String,
    pub version: String,
}

impl RequestLine {
    /// Splits a request line into its three parts.
    pub fn parse(line: &str) -> Result<Self, ProxyError> {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(uri), Some(version), None) if version.starts_with("HTTP/") => {
                Ok(Self {
                    method: method.to_string(),
                    uri: uri.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(ProxyError::BadRequest(format!(
                "malformed request line: {:?}",
                line.trim_end()
            ))),
        }
    }

    /// Only GET is forwarded; the method is matched case-insensitively.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

// == Target ==
/// Origin server and path a request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Target {
    /// Decomposes a request URI.
    ///
    /// Accepts absolute URIs (`http://host:port/path`), scheme-less authority
    /// forms (`host/path`), and origin-form paths (`/path`), which take their
    /// authority from the client's `Host` header.
    pub fn parse(uri: &str, host_header: Option<&str>) -> Result<Self, ProxyError> {
        let (authority, path) = if uri.starts_with('/') {
            let authority = host_header.ok_or(ProxyError::MissingHost)?;
            (authority.trim(), uri)
        } else {
            let rest = match uri.split_once("://") {
                Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
                Some((scheme, _)) => {
                    return Err(ProxyError::BadRequest(format!("unsupported scheme: {scheme}")))
                }
                None => uri,
            };
            match rest.find('/') {
                Some(index) => (&rest[..index], &rest[index..]),
                None => (rest, "/"),
            }
        };

        let (host, port) = parse_authority(authority)?;
        Ok(Self {
            host,
            port,
            path: path.to_string(),
        })
    }

    /// Key the response is cached under: `host:port` followed by the path.
    pub fn cache_key(&self) -> String {
        format!("{}:{}{}", self.host.to_ascii_lowercase(), self.port, self.path)
    }

    /// Host name suitable for socket resolution (IPv6 brackets removed).
    pub fn connect_host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    /// Value for an outbound `Host` header.
    pub fn host_header(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn parse_authority(authority: &str) -> Result<(String, u16), ProxyError> {
    // Userinfo is never forwarded
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) if !authority.ends_with(']') => {
            let port = port
                .parse::<u16>()
                .map_err(|_| ProxyError::BadRequest(format!("invalid port: {port:?}")))?;
            (host, port)
        }
        _ => (authority, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(ProxyError::BadRequest("empty host".to_string()));
    }
    Ok((host.to_string(), port))
}

// == Headers ==
/// Returns the value of the first header named `name` (case-insensitive).
pub fn header_value<'a>(headers: &'a [String], name: &str) -> Option<&'a str> {
    headers.iter().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Builds the HTTP/1.0 request sent to the origin server.
///
/// The proxy writes its own `Host`, `User-Agent`, `Connection` and
/// `Proxy-Connection` headers; every other client header is passed through
/// unchanged. The client's `Host` value is kept when it sent one.
pub fn build_origin_request(target: &Target, client_headers: &[String]) -> String {
    let host = header_value(client_headers, "Host")
        .map(str::to_string)
        .unwrap_or_else(|| target.host_header());

    let mut request = format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: close\r\nProxy-Connection: close\r\n",
        target.path, host, USER_AGENT
    );

    for line in client_headers {
        let name = line.split_once(':').map_or(line.as_str(), |(name, _)| name).trim();
        if REPLACED_HEADERS
            .iter()
            .any(|replaced| name.eq_ignore_ascii_case(replaced))
        {
            continue;
        }
        request.push_str(line);
        request.push_str("\r\n");
    }

    request.push_str("\r\n");
    request
}
