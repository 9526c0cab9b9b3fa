use webserv::config::ServerConfig;
use webserv::http::connection::request_complete;
use webserv::http::request::{HttpRequest, ParseError};
use webserv::http::response::{HttpResponse, error_response, reason_phrase, redirect};
use webserv::server::process_request;

#[test]
fn test_request_complete_needs_terminator() {
    assert!(!request_complete(b"GET / HTTP/1.1"));
    assert!(!request_complete(b"GET / HTTP/1.1\r\nHost: localhost\r\n"));
    assert!(request_complete(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"));
}

#[test]
fn test_request_complete_honors_content_length() {
    let head = b"POST /u HTTP/1.1\r\nContent-Length: 5\r\n\r\n";
    let mut buf = head.to_vec();
    assert!(!request_complete(&buf));

    buf.extend_from_slice(b"HEL");
    assert!(!request_complete(&buf));

    buf.extend_from_slice(b"LO");
    assert!(request_complete(&buf));

    buf.extend_from_slice(b"extra");
    assert!(request_complete(&buf));
}

#[test]
fn test_request_complete_header_case_and_spacing() {
    assert!(!request_complete(
        b"POST /u HTTP/1.1\r\ncontent-length:  3 \r\n\r\nab"
    ));
    assert!(request_complete(
        b"POST /u HTTP/1.1\r\ncontent-length:  3 \r\n\r\nabc"
    ));
}

#[test]
fn test_parse_simple_get() {
    let raw = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nUser-Agent: check\r\n\r\n";
    let req = HttpRequest::parse(raw, "./www").unwrap();

    assert_eq!(req.method, "GET");
    assert_eq!(req.uri, "/index.html");
    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.root, "./www");
    assert_eq!(req.headers.get("Host").unwrap(), "localhost");
    assert!(req.body.is_empty());
}

#[test]
fn test_parse_query_params() {
    let raw = b"GET /cgi/hello.py?x=1&flag&=skipped&y=2 HTTP/1.1\r\n\r\n";
    let req = HttpRequest::parse(raw, "./www").unwrap();

    assert_eq!(req.path(), "/cgi/hello.py");
    assert_eq!(req.query_string(), "x=1&flag&=skipped&y=2");
    assert_eq!(req.query_params.get("x").unwrap(), "1");
    assert_eq!(req.query_params.get("flag").unwrap(), "");
    assert_eq!(req.query_params.get("y").unwrap(), "2");
    assert!(!req.query_params.contains_key(""));
}

#[test]
fn test_header_lowercase_fallback() {
    let raw = b"POST /u HTTP/1.1\r\ncontent-length: 2\r\n\r\nhi";
    let req = HttpRequest::parse(raw, "./www").unwrap();
    assert_eq!(req.header("Content-Length"), Some("2"));
    assert_eq!(req.header("content-length"), Some("2"));
    assert_eq!(req.header("X-Missing"), None);
}

#[test]
fn test_duplicate_header_last_wins() {
    let raw = b"GET / HTTP/1.1\r\nX-Tag: one\r\nX-Tag: two\r\n\r\n";
    let req = HttpRequest::parse(raw, "./www").unwrap();
    assert_eq!(req.header("X-Tag"), Some("two"));
}

#[test]
fn test_body_is_everything_after_terminator() {
    let raw = b"POST /u HTTP/1.1\r\nContent-Length: 5\r\n\r\nHELLOWORLD";
    let req = HttpRequest::parse(raw, "./www").unwrap();
    assert_eq!(req.body, b"HELLOWORLD");
}

#[test]
fn test_malformed_request_line() {
    let err = HttpRequest::parse(b"GARBAGE\r\n\r\n", "./www").unwrap_err();
    assert_eq!(err, ParseError::MalformedRequestLine);

    let err = HttpRequest::parse(b"GET /\r\n\r\n", "./www").unwrap_err();
    assert_eq!(err, ParseError::MalformedRequestLine);
}

#[test]
fn test_response_serialization_invariants() {
    let mut res = HttpResponse::new(200);
    res.set_body(b"Hello Rust".to_vec(), "text/plain");

    let bytes = res.to_bytes();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: text/plain\r\n"));
    assert!(text.contains("Content-Length: 10\r\n"));
    assert!(text.contains("Connection: close\r\n"));
    assert!(text.ends_with("\r\n\r\nHello Rust"));
}

#[test]
fn test_empty_response_still_has_length_and_close() {
    let text = String::from_utf8_lossy(&HttpResponse::new(204).to_bytes()).into_owned();
    assert!(text.starts_with("HTTP/1.1 204 No Content\r\n"));
    assert!(text.contains("Content-Length: 0\r\n"));
    assert!(text.contains("Connection: close\r\n"));
}

#[test]
fn test_explicit_content_length_is_kept() {
    let mut res = HttpResponse::new(200);
    res.set_header("Content-Length", "99");
    let text = String::from_utf8_lossy(&res.to_bytes()).into_owned();
    assert!(text.contains("Content-Length: 99\r\n"));
}

#[test]
fn test_reason_phrase_table() {
    assert_eq!(reason_phrase(200), "OK");
    assert_eq!(reason_phrase(301), "Moved Permanently");
    assert_eq!(reason_phrase(405), "Method Not Allowed");
    assert_eq!(reason_phrase(411), "Length Required");
    assert_eq!(reason_phrase(502), "Bad Gateway");
    assert_eq!(reason_phrase(504), "Gateway Timeout");
    assert_eq!(reason_phrase(418), "Unknown");
}

#[test]
fn test_error_response_names_code_and_reason() {
    let res = error_response(404, "HTTP/1.1", None);
    let body = String::from_utf8_lossy(&res.body).into_owned();
    assert_eq!(res.status_code, 404);
    assert!(body.contains("404 Not Found"));
}

#[test]
fn test_redirect_has_location_and_empty_body() {
    let res = redirect(301, "/moved/", "HTTP/1.1");
    assert_eq!(res.status_code, 301);
    assert_eq!(res.header("Location"), Some("/moved/"));

    let text = String::from_utf8_lossy(&res.to_bytes()).into_owned();
    assert!(text.contains("Location: /moved/\r\n"));
    assert!(text.contains("Content-Length: 0\r\n"));
}

#[test]
fn test_process_request_always_yields_one_well_formed_response() {
    let config = ServerConfig::default();
    let peer = "127.0.0.1:40000".parse().unwrap();

    for raw in [
        b"GET /definitely-missing HTTP/1.1\r\n\r\n".as_slice(),
        b"NOT-A-REQUEST\r\n\r\n".as_slice(),
        b"PATCH / HTTP/1.1\r\n\r\n".as_slice(),
    ] {
        let bytes = process_request(raw, peer, &config);
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert!(text.starts_with("HTTP/1.1 "), "got: {text}");
        assert!(text.contains("Connection: close\r\n"), "got: {text}");
        assert!(text.contains("Content-Length: "), "got: {text}");
    }
}
