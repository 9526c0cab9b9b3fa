use crate::fastcgi::{FastCgiClient, is_fastcgi_target};
use crate::handlers::method_not_allowed;
use crate::prelude::*;
use crate::router::{resolve_base_dir, resolve_suffix};

pub fn handle_delete(
    request: &HttpRequest,
    location: Option<&LocationConfig>,
    peer_addr: Option<SocketAddr>,
    config: &ServerConfig,
) -> HttpResponse {
    let suffix = resolve_suffix(location, request.path());
    if suffix.contains("..") {
        return error_response(HTTP_BAD_REQUEST, &request.version, Some(config));
    }

    if let Some(loc) = location {
        if !loc.allowed_methods.is_empty() && !is_method_allowed(&loc.allowed_methods, "DELETE") {
            return method_not_allowed(request, &loc.allowed_methods, config);
        }
    }

    let base_dir = resolve_base_dir(location, &config.root, true);
    let target = format!("{}/{}", base_dir.trim_end_matches('/'), suffix);

    let meta = match fs::metadata(&target) {
        Ok(meta) => meta,
        Err(_) => return error_response(HTTP_NOT_FOUND, &request.version, Some(config)),
    };

    if let Some(loc) = location {
        if is_fastcgi_target(loc, &target) {
            return FastCgiClient::new(request, config, loc, target, peer_addr).execute();
        }
    }

    if meta.is_dir() {
        return error_response(HTTP_FORBIDDEN, &request.version, Some(config));
    }

    if meta.permissions().readonly() {
        return error_response(HTTP_FORBIDDEN, &request.version, Some(config));
    }

    match fs::remove_file(&target) {
        Ok(()) => {
            info!("DELETE {} -> {}", request.uri, target);
            let mut res = HttpResponse::new(HTTP_OK);
            res.set_version(&request.version).set_body(
                b"<html><body><h1>200 OK</h1><p>Deleted</p></body></html>".to_vec(),
                "text/html; charset=UTF-8",
            );
            res
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            error_response(HTTP_FORBIDDEN, &request.version, Some(config))
        }
        Err(_) => error_response(HTTP_INTERNAL_SERVER_ERROR, &request.version, Some(config)),
    }
}
