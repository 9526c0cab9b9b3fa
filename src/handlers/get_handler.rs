use crate::fastcgi::{FastCgiClient, is_fastcgi_target};
use crate::handlers::method_not_allowed;
use crate::http::response::redirect;
use crate::prelude::*;
use crate::router::{resolve_base_dir, resolve_suffix};

pub fn handle_get(
    request: &HttpRequest,
    location: Option<&LocationConfig>,
    peer_addr: Option<SocketAddr>,
    config: &ServerConfig,
) -> HttpResponse {
    if let Some(loc) = location {
        if !loc.allowed_methods.is_empty() && !is_method_allowed(&loc.allowed_methods, "GET") {
            return method_not_allowed(request, &loc.allowed_methods, config);
        }
    }

    let uri_path = request.path();
    if uri_path.contains("..") {
        return error_response(HTTP_FORBIDDEN, &request.version, Some(config));
    }

    let base_dir = resolve_base_dir(location, &config.root, false);
    let suffix = resolve_suffix(location, uri_path);

    // dir_path always carries a trailing slash; a concrete file target is
    // dir_path with that slash removed
    let is_dir_request = suffix.is_empty() || suffix.ends_with('/');
    let mut dir_path = base_dir.trim_end_matches('/').to_string();
    dir_path.push('/');
    dir_path.push_str(&suffix);
    if !dir_path.ends_with('/') {
        dir_path.push('/');
    }

    let target: PathBuf = if is_dir_request {
        match resolve_index(&dir_path, &config.index_files) {
            Some(found) => PathBuf::from(found),
            None => {
                match fs::metadata(&dir_path) {
                    Ok(meta) if meta.is_dir() => {}
                    _ => return error_response(HTTP_NOT_FOUND, &request.version, Some(config)),
                }
                if location.is_some_and(|loc| loc.autoindex) {
                    return match generate_autoindex(Path::new(&dir_path), uri_path) {
                        Ok(mut res) => {
                            res.set_version(&request.version);
                            res
                        }
                        Err(_) => error_response(HTTP_FORBIDDEN, &request.version, Some(config)),
                    };
                }
                return error_response(HTTP_FORBIDDEN, &request.version, Some(config));
            }
        }
    } else {
        PathBuf::from(dir_path.trim_end_matches('/'))
    };

    let meta = match fs::metadata(&target) {
        Ok(meta) => meta,
        Err(_) => return error_response(HTTP_NOT_FOUND, &request.version, Some(config)),
    };

    if meta.is_dir() {
        if !uri_path.ends_with('/') {
            return redirect(
                HTTP_MOVED_PERMANENTLY,
                &format!("{uri_path}/"),
                &request.version,
            );
        }
        return error_response(HTTP_FORBIDDEN, &request.version, Some(config));
    }

    let mut file = match File::open(&target) {
        Ok(file) => file,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::PermissionDenied => HTTP_FORBIDDEN,
                ErrorKind::NotFound => HTTP_NOT_FOUND,
                _ => HTTP_INTERNAL_SERVER_ERROR,
            };
            return error_response(code, &request.version, Some(config));
        }
    };

    let target_str = target.to_string_lossy().into_owned();
    if let Some(loc) = location {
        if is_fastcgi_target(loc, &target_str) {
            drop(file);
            return FastCgiClient::new(request, config, loc, target_str, peer_addr).execute();
        }
    }

    let mut content = Vec::with_capacity(meta.len() as usize);
    if file.read_to_end(&mut content).is_err() {
        return error_response(HTTP_INTERNAL_SERVER_ERROR, &request.version, Some(config));
    }

    let mut res = HttpResponse::new(HTTP_OK);
    res.set_version(&request.version)
        .set_body(content, content_type_for_path(&target));
    res
}

fn resolve_index(dir_path: &str, index_files: &[String]) -> Option<String> {
    for index in index_files {
        let try_path = format!("{dir_path}{index}");
        if let Ok(meta) = fs::metadata(&try_path) {
            if !meta.is_dir() {
                return Some(try_path);
            }
        }
    }
    None
}
