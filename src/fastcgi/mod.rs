pub mod backend;

use crate::prelude::*;
use std::net::{Ipv4Addr, TcpStream as UpstreamStream};

pub const FCGI_VERSION_1: u8 = 1;
pub const FCGI_BEGIN_REQUEST: u8 = 1;
pub const FCGI_END_REQUEST: u8 = 3;
pub const FCGI_PARAMS: u8 = 4;
pub const FCGI_STDIN: u8 = 5;
pub const FCGI_STDOUT: u8 = 6;
pub const FCGI_STDERR: u8 = 7;

pub const FCGI_RESPONDER: u16 = 1;
pub const FCGI_REQUEST_ID: u16 = 1;

// PARAMS records are flushed before they would cross this size
pub const PARAMS_RECORD_LIMIT: usize = 60_000;
// STDIN content is hard-capped by the u16 length field
pub const STDIN_RECORD_LIMIT: usize = 65_535;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordHeader {
    pub version: u8,
    pub rec_type: u8,
    pub request_id: u16,
    pub content_length: u16,
    pub padding_length: u8,
}

impl RecordHeader {
    pub fn parse(bytes: &[u8; 8]) -> RecordHeader {
        RecordHeader {
            version: bytes[0],
            rec_type: bytes[1],
            request_id: u16::from_be_bytes([bytes[2], bytes[3]]),
            content_length: u16::from_be_bytes([bytes[4], bytes[5]]),
            padding_length: bytes[6],
        }
    }
}

/// 8-byte header plus content. Request id is fixed at 1, padding at 0;
/// the two counted fields go out big-endian.
pub fn encode_record(rec_type: u8, content: &[u8]) -> Vec<u8> {
    debug_assert!(content.len() <= u16::MAX as usize);
    let mut record = Vec::with_capacity(8 + content.len());
    record.push(FCGI_VERSION_1);
    record.push(rec_type);
    record.extend_from_slice(&FCGI_REQUEST_ID.to_be_bytes());
    record.extend_from_slice(&(content.len() as u16).to_be_bytes());
    record.push(0); // paddingLength
    record.push(0); // reserved
    record.extend_from_slice(content);
    record
}

/// Name-value pair encoding: each length is one byte below 128, otherwise
/// four bytes big-endian with the high bit set on the first.
pub fn encode_name_value(name: &str, value: &str, out: &mut Vec<u8>) {
    for len in [name.len(), value.len()] {
        if len < 128 {
            out.push(len as u8);
        } else {
            out.extend_from_slice(&((len as u32) | 0x8000_0000).to_be_bytes());
        }
    }
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(value.as_bytes());
}

pub fn begin_request_body() -> [u8; 8] {
    let role = FCGI_RESPONDER.to_be_bytes();
    [role[0], role[1], 0, 0, 0, 0, 0, 0]
}

pub fn is_fastcgi_target(location: &LocationConfig, path: &str) -> bool {
    !location.fastcgi_pass.is_empty()
        && location
            .cgi_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
}

/// One synchronous exchange with the upstream, instantiated per request.
/// The upstream socket never outlives `execute`.
pub struct FastCgiClient<'a> {
    request: &'a HttpRequest,
    server: &'a ServerConfig,
    location: &'a LocationConfig,
    script: String,
    peer_addr: Option<SocketAddr>,
}

impl<'a> FastCgiClient<'a> {
    pub fn new(
        request: &'a HttpRequest,
        server: &'a ServerConfig,
        location: &'a LocationConfig,
        script: String,
        peer_addr: Option<SocketAddr>,
    ) -> Self {
        Self {
            request,
            server,
            location,
            script,
            peer_addr,
        }
    }

    pub fn execute(&self) -> HttpResponse {
        let Some(addr) = parse_endpoint(&self.location.fastcgi_pass) else {
            return self.gateway_error(HTTP_BAD_GATEWAY, "Invalid fastcgi_pass");
        };

        let mut upstream = match UpstreamStream::connect(addr) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("FastCGI connect to {} failed: {}", addr, e);
                return self.gateway_error(HTTP_GATEWAY_TIMEOUT, "FastCGI connect failed");
            }
        };

        match self.exchange(&mut upstream) {
            Ok(stdout) if stdout.is_empty() => {
                self.gateway_error(HTTP_BAD_GATEWAY, "Empty FastCGI response")
            }
            Ok(stdout) => assemble_response(&self.request.version, &stdout),
            Err(e) => {
                warn!("FastCGI exchange with {} failed: {}", addr, e);
                self.gateway_error(HTTP_BAD_GATEWAY, "FastCGI exchange failed")
            }
        }
    }

    fn exchange(&self, upstream: &mut UpstreamStream) -> std::io::Result<Vec<u8>> {
        upstream.write_all(&encode_record(FCGI_BEGIN_REQUEST, &begin_request_body()))?;
        self.send_params(upstream)?;
        self.send_stdin(upstream)?;
        read_stdout(upstream)
    }

    fn send_params(&self, upstream: &mut UpstreamStream) -> std::io::Result<()> {
        let mut buffer: Vec<u8> = Vec::with_capacity(1024);

        for (name, value) in self.build_params() {
            let mut pair = Vec::with_capacity(8 + name.len() + value.len());
            encode_name_value(&name, &value, &mut pair);
            if !buffer.is_empty() && buffer.len() + pair.len() > PARAMS_RECORD_LIMIT {
                upstream.write_all(&encode_record(FCGI_PARAMS, &buffer))?;
                buffer.clear();
            }
            buffer.extend_from_slice(&pair);
        }

        if !buffer.is_empty() {
            upstream.write_all(&encode_record(FCGI_PARAMS, &buffer))?;
        }
        // empty PARAMS record terminates the stream
        upstream.write_all(&encode_record(FCGI_PARAMS, &[]))
    }

    fn send_stdin(&self, upstream: &mut UpstreamStream) -> std::io::Result<()> {
        for chunk in self.request.body.chunks(STDIN_RECORD_LIMIT) {
            upstream.write_all(&encode_record(FCGI_STDIN, chunk))?;
        }
        upstream.write_all(&encode_record(FCGI_STDIN, &[]))
    }

    fn build_params(&self) -> Vec<(String, String)> {
        let path = self.request.path();
        let protocol = if self.request.version.is_empty() {
            "HTTP/1.1"
        } else {
            &self.request.version
        };

        let mut params: Vec<(String, String)> = vec![
            ("GATEWAY_INTERFACE".into(), "CGI/1.1".into()),
            ("REQUEST_METHOD".into(), self.request.method.clone()),
            ("SERVER_PROTOCOL".into(), protocol.to_string()),
            ("SERVER_NAME".into(), self.server.server_name.clone()),
            ("SERVER_PORT".into(), self.server.port.to_string()),
            ("QUERY_STRING".into(), self.request.query_string().to_string()),
            ("SCRIPT_NAME".into(), path.to_string()),
            ("PATH_INFO".into(), path.to_string()),
            ("SCRIPT_FILENAME".into(), self.script.clone()),
            ("DOCUMENT_ROOT".into(), self.server.root.clone()),
        ];

        if let Some(content_type) = self.request.header("Content-Type") {
            params.push(("CONTENT_TYPE".into(), content_type.to_string()));
        }

        let content_length = self
            .request
            .header("Content-Length")
            .map(str::to_string)
            .unwrap_or_else(|| self.request.body.len().to_string());
        params.push(("CONTENT_LENGTH".into(), content_length));

        if let Some(peer) = self.peer_addr {
            params.push(("REMOTE_ADDR".into(), peer.ip().to_string()));
            params.push(("REMOTE_PORT".into(), peer.port().to_string()));
        }

        params.push(("REDIRECT_STATUS".into(), "200".into()));
        params
    }

    fn gateway_error(&self, code: u16, detail: &str) -> HttpResponse {
        let reason = reason_phrase(code);
        let body =
            format!("<html><body><h1>{code} {reason}</h1><p>{detail}</p></body></html>");
        let mut res = HttpResponse::new(code);
        res.set_version(&self.request.version)
            .set_body(body.into_bytes(), "text/html; charset=UTF-8");
        res
    }
}

/// Collects STDOUT content until END_REQUEST, consuming padding exactly.
/// STDERR is discarded; EOF before END_REQUEST is an error.
fn read_stdout(upstream: &mut UpstreamStream) -> std::io::Result<Vec<u8>> {
    let mut stdout_data = Vec::new();

    loop {
        let mut header_bytes = [0u8; 8];
        upstream.read_exact(&mut header_bytes)?;
        let header = RecordHeader::parse(&header_bytes);

        let total = header.content_length as usize + header.padding_length as usize;
        let mut payload = vec![0u8; total];
        upstream.read_exact(&mut payload)?;

        match header.rec_type {
            FCGI_STDOUT => {
                stdout_data.extend_from_slice(&payload[..header.content_length as usize]);
            }
            FCGI_END_REQUEST => return Ok(stdout_data),
            _ => {} // STDERR and anything unexpected
        }
    }
}

/// Splits the CGI output into header block and body, applies the `Status:`
/// override, and defaults Content-Type when the script set none.
pub fn assemble_response(version: &str, raw: &[u8]) -> HttpResponse {
    let (header_block, body): (&[u8], &[u8]) = match find_subsequence(raw, b"\r\n\r\n", 0) {
        Some(pos) => (&raw[..pos], &raw[pos + 4..]),
        None => match find_subsequence(raw, b"\n\n", 0) {
            Some(pos) => (&raw[..pos], &raw[pos + 2..]),
            None => (&[], raw),
        },
    };

    let mut res = HttpResponse::new(HTTP_OK);
    res.set_version(version);

    let header_text = String::from_utf8_lossy(header_block);
    for line in header_text.split('\n') {
        let line = line.trim_end_matches('\r');
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim_start();

        if key.eq_ignore_ascii_case("status") {
            let mut parts = value.splitn(2, ' ');
            if let Some(code) = parts.next().and_then(|c| c.parse::<u16>().ok()) {
                res.set_status_code(code);
                if let Some(reason) = parts.next() {
                    let reason = reason.trim();
                    if !reason.is_empty() {
                        res.set_reason(reason);
                    }
                }
            }
        } else {
            res.set_header(key, value);
        }
    }

    if res.header("Content-Type").is_none() {
        res.set_header("Content-Type", "text/html; charset=UTF-8");
    }
    res.body = body.to_vec();
    res
}

fn parse_endpoint(pass: &str) -> Option<SocketAddr> {
    let (host, port_part) = pass.split_once(':')?;
    let port: u16 = port_part.parse().ok()?;
    if port == 0 {
        return None;
    }
    let host = if host == "localhost" { "127.0.0.1" } else { host };
    let ip: Ipv4Addr = host.parse().ok()?;
    Some(SocketAddr::from((ip, port)))
}
