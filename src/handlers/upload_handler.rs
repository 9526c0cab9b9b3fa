use crate::fastcgi::{FastCgiClient, is_fastcgi_target};
use crate::handlers::method_not_allowed;
use crate::prelude::*;
use crate::router::{resolve_base_dir, resolve_suffix};
use std::os::unix::fs::OpenOptionsExt;

pub fn handle_post(
    request: &HttpRequest,
    location: Option<&LocationConfig>,
    peer_addr: Option<SocketAddr>,
    config: &ServerConfig,
) -> HttpResponse {
    let Some(loc) = location else {
        let mut res = error_response(HTTP_METHOD_NOT_ALLOWED, &request.version, Some(config));
        res.set_header("Allow", "GET");
        return res;
    };

    if !is_method_allowed(&loc.allowed_methods, "POST") {
        return method_not_allowed(request, &loc.allowed_methods, config);
    }

    let Some(raw_length) = request.header("Content-Length") else {
        return error_response(HTTP_LENGTH_REQUIRED, &request.version, Some(config));
    };
    let declared = parse_content_length(raw_length);

    let max = config.client_max_body_size;
    if max > 0 && (declared > max || request.body.len() > max) {
        return error_response(HTTP_PAYLOAD_TOO_LARGE, &request.version, Some(config));
    }

    if request.body.len() < declared {
        return error_response(HTTP_BAD_REQUEST, &request.version, Some(config));
    }

    let base_dir = resolve_base_dir(Some(loc), &config.root, true);
    let suffix = resolve_suffix(Some(loc), request.path());
    if suffix.is_empty() || suffix.contains("..") {
        return error_response(HTTP_BAD_REQUEST, &request.version, Some(config));
    }

    let target = format!("{}/{}", base_dir.trim_end_matches('/'), suffix);

    if is_fastcgi_target(loc, &target) {
        // the script must already exist and be readable
        return match File::open(&target) {
            Ok(_) => FastCgiClient::new(request, config, loc, target, peer_addr).execute(),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                error_response(HTTP_FORBIDDEN, &request.version, Some(config))
            }
            Err(_) => error_response(HTTP_NOT_FOUND, &request.version, Some(config)),
        };
    }

    let opened = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(&target);

    let mut file = match opened {
        Ok(file) => file,
        Err(e) => {
            warn!("POST {}: cannot open '{}': {}", request.uri, target, e);
            return error_response(HTTP_INTERNAL_SERVER_ERROR, &request.version, Some(config));
        }
    };

    if file.write_all(&request.body[..declared]).is_err() {
        let _ = fs::remove_file(&target);
        return error_response(HTTP_INTERNAL_SERVER_ERROR, &request.version, Some(config));
    }

    info!("POST {} -> {} ({} bytes)", request.uri, target, declared);

    let mut res = HttpResponse::new(HTTP_CREATED);
    res.set_version(&request.version)
        .set_header("Location", request.path())
        .set_body(
            b"<html><body><h1>201 Created</h1></body></html>".to_vec(),
            "text/html; charset=UTF-8",
        );
    res
}

/// Non-negative decimal; anything else counts as zero.
fn parse_content_length(value: &str) -> usize {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    trimmed.parse().unwrap_or(0)
}
