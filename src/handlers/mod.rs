pub mod delete_handler;
pub mod get_handler;
pub mod upload_handler;

pub use delete_handler::handle_delete;
pub use get_handler::handle_get;
pub use upload_handler::handle_post;

use crate::http::response::redirect;
use crate::prelude::*;

/// Routes one parsed request to its method handler. A `return` directive on
/// the matched location short-circuits everything else.
pub fn handle_request(
    request: &HttpRequest,
    peer_addr: Option<SocketAddr>,
    config: &ServerConfig,
) -> HttpResponse {
    let location = match_location(&config.locations, request.path());

    if let Some(loc) = location {
        if let (Some(code), Some(target)) = (loc.redirect_code, &loc.redirect_target) {
            return redirect(code, target, &request.version);
        }
    }

    match request.method.as_str() {
        "GET" => handle_get(request, location, peer_addr, config),
        "POST" => handle_post(request, location, peer_addr, config),
        "DELETE" => handle_delete(request, location, peer_addr, config),
        other => {
            trace!("Unsupported method {} for {}", other, request.uri);
            let allow = match location {
                Some(loc) if !loc.allowed_methods.is_empty() => {
                    allow_header(&loc.allowed_methods)
                }
                _ => "GET, POST, DELETE".to_string(),
            };
            let mut res = error_response(HTTP_METHOD_NOT_ALLOWED, &request.version, Some(config));
            res.set_header("Allow", &allow);
            res
        }
    }
}

pub(crate) fn method_not_allowed(
    request: &HttpRequest,
    methods: &[String],
    config: &ServerConfig,
) -> HttpResponse {
    let mut res = error_response(HTTP_METHOD_NOT_ALLOWED, &request.version, Some(config));
    res.set_header("Allow", &allow_header(methods));
    res
}
