use crate::config::ServerConfig;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}

/// Every response is composed here so no handler path can forget
/// `Content-Length` or `Connection: close`.
#[derive(Debug)]
pub struct HttpResponse {
    pub version: String,
    pub status_code: u16,
    pub reason: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status_code,
            reason: reason_phrase(status_code).to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn set_version(&mut self, version: &str) -> &mut Self {
        if !version.is_empty() {
            self.version = version.to_string();
        }
        self
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.reason = reason_phrase(code).to_string();
        self
    }

    pub fn set_reason(&mut self, reason: &str) -> &mut Self {
        self.reason = reason.to_string();
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) -> &mut Self {
        self.headers
            .insert("content-type".to_string(), content_type.to_string());
        self.body = body;
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(|v| v.as_str())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = format!(
            "{} {} {}\r\n",
            self.version, self.status_code, self.reason
        )
        .into_bytes();

        for (key, val) in &self.headers {
            if key == "connection" || key == "content-length" {
                continue;
            }
            res.extend_from_slice(format!("{}: {}\r\n", to_pascal_case(key), val).as_bytes());
        }

        let content_length = self
            .headers
            .get("content-length")
            .cloned()
            .unwrap_or_else(|| self.body.len().to_string());
        res.extend_from_slice(format!("Content-Length: {content_length}\r\n").as_bytes());
        res.extend_from_slice(b"Connection: close\r\n\r\n");
        res.extend_from_slice(&self.body);
        res
    }
}

fn to_pascal_case(s: &str) -> String {
    s.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

pub fn content_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=UTF-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

pub fn redirect(code: u16, target: &str, version: &str) -> HttpResponse {
    let mut res = HttpResponse::new(code);
    if res.reason == "Unknown" {
        res.set_reason("Found");
    }
    res.set_version(version).set_header("Location", target);
    res
}

/// Minimal HTML error document; a configured `error_page` file replaces
/// the generated body when it can be read.
pub fn error_response(code: u16, version: &str, config: Option<&ServerConfig>) -> HttpResponse {
    let reason = reason_phrase(code);
    let mut res = HttpResponse::new(code);
    res.set_version(version);

    if let Some(cfg) = config {
        if let Some(page) = cfg.error_pages.get(&code) {
            if let Ok(content) = fs::read(page) {
                res.set_body(content, "text/html; charset=UTF-8");
                return res;
            }
        }
    }

    let body = format!(
        "<html><head><title>{code} {reason}</title></head><body><h1>{code} {reason}</h1></body></html>"
    );
    res.set_body(body.into_bytes(), "text/html; charset=UTF-8");
    res
}

/// HTML listing of a directory's immediate children, one anchor per entry.
/// Directory entries get a trailing slash in their label.
pub fn generate_autoindex(dir_path: &Path, request_uri: &str) -> std::io::Result<HttpResponse> {
    let mut entries: Vec<(String, bool)> = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push((name, is_dir));
    }
    entries.sort();

    let base = request_uri.trim_end_matches('/');
    let mut html = format!("<html><head><title>Index of {request_uri}</title></head><body><h1>Index of {request_uri}</h1><ul>");
    for (name, is_dir) in &entries {
        let label = if *is_dir {
            format!("{name}/")
        } else {
            name.clone()
        };
        html.push_str(&format!("<li><a href=\"{base}/{name}\">{label}</a></li>"));
    }
    html.push_str("</ul></body></html>");

    let mut res = HttpResponse::new(200);
    res.set_body(html.into_bytes(), "text/html; charset=UTF-8");
    Ok(res)
}
