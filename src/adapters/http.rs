//! Blocking HTTP client adapter.
//!
//! Implements [`HttpPort`]: one POST per call, no retries, bounded by
//! the caller's timeout.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: one `esp_http_client` handle per request
//!   (init → headers → post field → perform → status → cleanup). The
//!   client sets `Content-Length` from the post field. `https://` URLs use
//!   the bundled CA certificates.
//! - **all other targets**: plain HTTP/1.1 over `std::net::TcpStream`.
//!   One deadline covers name resolution, connect, the request write and
//!   the status-line read; every socket call gets only the time left.
//!   `https://` is not supported on the host and fails as a transport
//!   error.

use core::time::Duration;

use log::{debug, warn};

use crate::app::ports::HttpPort;
use crate::error::TransportError;

#[cfg(not(target_os = "espidf"))]
use std::io::{ErrorKind, Read, Write};
#[cfg(not(target_os = "espidf"))]
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
#[cfg(not(target_os = "espidf"))]
use std::sync::mpsc::{self, RecvTimeoutError};
#[cfg(not(target_os = "espidf"))]
use std::thread;
#[cfg(not(target_os = "espidf"))]
use std::time::Instant;

/// Longest status line the host client accepts.
#[cfg(not(target_os = "espidf"))]
const MAX_STATUS_LINE: usize = 256;

/// Stateless HTTP client. Each request opens and closes its own
/// connection.
#[derive(Debug, Default)]
pub struct HttpClientAdapter {
    requests: u32,
}

impl HttpClientAdapter {
    pub fn new() -> Self {
        Self { requests: 0 }
    }

    /// Requests issued since construction.
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl HttpPort for HttpClientAdapter {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
        timeout: Duration,
    ) -> Result<u16, TransportError> {
        self.requests = self.requests.wrapping_add(1);
        let status = platform_post(url, headers, body, timeout)?;
        debug!("HTTP: POST {} -> {}", url, status);
        Ok(status)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF: esp_http_client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn platform_post(
    url: &str,
    headers: &[(&str, &str)],
    body: &[u8],
    timeout: Duration,
) -> Result<u16, TransportError> {
    use esp_idf_svc::sys;
    use std::ffi::CString;

    let url_c = CString::new(url).map_err(|_| TransportError::InvalidUrl)?;
    let header_c = headers
        .iter()
        .map(|(k, v)| Ok((CString::new(*k)?, CString::new(*v)?)))
        .collect::<Result<Vec<_>, std::ffi::NulError>>()
        .map_err(|_| TransportError::Encode)?;
    let body_len = i32::try_from(body.len()).map_err(|_| TransportError::Encode)?;

    // SAFETY: every pointer handed to the client (URL, header strings,
    // body) outlives the handle, which is cleaned up on every path below.
    unsafe {
        let mut cfg: sys::esp_http_client_config_t = core::mem::zeroed();
        cfg.url = url_c.as_ptr();
        cfg.method = sys::esp_http_client_method_t_HTTP_METHOD_POST;
        cfg.timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
        if url.starts_with("https://") {
            cfg.transport_type = sys::esp_http_client_transport_t_HTTP_TRANSPORT_OVER_SSL;
            cfg.crt_bundle_attach = Some(sys::esp_crt_bundle_attach);
        }

        let client = sys::esp_http_client_init(&cfg);
        if client.is_null() {
            warn!("HTTP: esp_http_client_init failed");
            return Err(TransportError::Connect);
        }

        for (k, v) in &header_c {
            sys::esp_http_client_set_header(client, k.as_ptr(), v.as_ptr());
        }
        sys::esp_http_client_set_post_field(client, body.as_ptr().cast(), body_len);

        let err = sys::esp_http_client_perform(client);
        let result = if err == sys::ESP_OK as sys::esp_err_t {
            let status = sys::esp_http_client_get_status_code(client);
            u16::try_from(status).map_err(|_| TransportError::MalformedResponse)
        } else if err == sys::ESP_ERR_TIMEOUT as sys::esp_err_t {
            warn!("HTTP: request timed out after {} ms", timeout.as_millis());
            Err(TransportError::Timeout)
        } else {
            warn!("HTTP: esp_http_client_perform failed: 0x{:X}", err as u32);
            Err(TransportError::Connect)
        };

        sys::esp_http_client_cleanup(client);
        result
    }
}

// ───────────────────────────────────────────────────────────────
// Host: HTTP/1.1 over std::net
// ───────────────────────────────────────────────────────────────

/// Split `http://host[:port]/path` into its parts.
#[cfg(not(target_os = "espidf"))]
fn split_url(url: &str) -> Result<(&str, u16, &str), TransportError> {
    let rest = url
        .strip_prefix("http://")
        .ok_or(TransportError::InvalidUrl)?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h, p.parse().map_err(|_| TransportError::InvalidUrl)?),
        None => (authority, 80),
    };
    if host.is_empty() {
        return Err(TransportError::InvalidUrl);
    }
    Ok((host, port, path))
}

#[cfg(not(target_os = "espidf"))]
fn io_error(e: &std::io::Error) -> TransportError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportError::Timeout,
        ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable => TransportError::Connect,
        _ => TransportError::Io,
    }
}

/// Wall-clock budget for one request.
#[cfg(not(target_os = "espidf"))]
struct Deadline(Instant);

#[cfg(not(target_os = "espidf"))]
impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Time left, or `Timeout` once the budget is spent.
    fn remaining(&self) -> Result<Duration, TransportError> {
        let left = self.0.saturating_duration_since(Instant::now());
        if left.is_zero() {
            Err(TransportError::Timeout)
        } else {
            Ok(left)
        }
    }
}

/// Resolve `host:port`. IP literals skip the resolver; names are looked
/// up on a helper thread so the lookup is bounded by the deadline.
#[cfg(not(target_os = "espidf"))]
fn resolve(host: &str, port: u16, deadline: &Deadline) -> Result<SocketAddr, TransportError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    let (tx, rx) = mpsc::channel();
    let name = format!("{host}:{port}");
    thread::spawn(move || {
        let first = name.to_socket_addrs().ok().and_then(|mut addrs| addrs.next());
        let _ = tx.send(first);
    });
    match rx.recv_timeout(deadline.remaining()?) {
        Ok(Some(addr)) => Ok(addr),
        Ok(None) | Err(RecvTimeoutError::Disconnected) => Err(TransportError::Connect),
        Err(RecvTimeoutError::Timeout) => Err(TransportError::Timeout),
    }
}

#[cfg(not(target_os = "espidf"))]
fn write_before(
    stream: &TcpStream,
    mut buf: &[u8],
    deadline: &Deadline,
) -> Result<(), TransportError> {
    let mut writer = stream;
    while !buf.is_empty() {
        stream
            .set_write_timeout(Some(deadline.remaining()?))
            .map_err(|e| io_error(&e))?;
        match writer.write(buf) {
            Ok(0) => return Err(TransportError::Io),
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(io_error(&e)),
        }
    }
    Ok(())
}

/// Read up to the first `\n`. A server that trickles bytes still runs
/// into the deadline.
#[cfg(not(target_os = "espidf"))]
fn read_status_line_before(
    stream: &TcpStream,
    deadline: &Deadline,
) -> Result<String, TransportError> {
    let mut reader = stream;
    let mut line = Vec::new();
    let mut chunk = [0u8; 64];
    loop {
        stream
            .set_read_timeout(Some(deadline.remaining()?))
            .map_err(|e| io_error(&e))?;
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error(&e)),
        };
        if n == 0 {
            break;
        }
        line.extend_from_slice(&chunk[..n]);
        if let Some(end) = line.iter().position(|&b| b == b'\n') {
            line.truncate(end);
            break;
        }
        if line.len() > MAX_STATUS_LINE {
            return Err(TransportError::MalformedResponse);
        }
    }
    if line.is_empty() {
        return Err(TransportError::MalformedResponse);
    }
    String::from_utf8(line).map_err(|_| TransportError::MalformedResponse)
}

/// Parse the status code out of `HTTP/1.x NNN reason`.
#[cfg(not(target_os = "espidf"))]
fn parse_status_line(line: &str) -> Result<u16, TransportError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/1.") => {
            code.parse().map_err(|_| TransportError::MalformedResponse)
        }
        _ => Err(TransportError::MalformedResponse),
    }
}

#[cfg(not(target_os = "espidf"))]
fn platform_post(
    url: &str,
    headers: &[(&str, &str)],
    body: &[u8],
    timeout: Duration,
) -> Result<u16, TransportError> {
    let (host, port, path) = split_url(url)?;
    let deadline = Deadline::after(timeout);

    let addr = resolve(host, port, &deadline)?;
    let stream = TcpStream::connect_timeout(&addr, deadline.remaining()?).map_err(|e| {
        warn!("HTTP: connect to {} failed: {}", addr, e);
        io_error(&e)
    })?;

    let mut request = format!("POST {path} HTTP/1.1\r\nHost: {host}:{port}\r\n");
    for (k, v) in headers {
        request.push_str(k);
        request.push_str(": ");
        request.push_str(v);
        request.push_str("\r\n");
    }
    request.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    ));

    write_before(&stream, request.as_bytes(), &deadline)?;
    write_before(&stream, body, &deadline)?;

    let status_line = read_status_line_before(&stream, &deadline)?;
    parse_status_line(&status_line)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
