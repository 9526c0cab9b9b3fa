use webserv::config::LocationConfig;
use webserv::router::{
    allow_header, is_method_allowed, match_location, resolve_base_dir, resolve_suffix,
};

fn loc(prefix: &str) -> LocationConfig {
    LocationConfig {
        location: prefix.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_longest_prefix_wins() {
    let locations = vec![loc("/"), loc("/upload"), loc("/upload/images")];

    let best = match_location(&locations, "/upload/images/cat.png").unwrap();
    assert_eq!(best.location, "/upload/images");

    let best = match_location(&locations, "/upload/file.bin").unwrap();
    assert_eq!(best.location, "/upload");

    let best = match_location(&locations, "/other").unwrap();
    assert_eq!(best.location, "/");
}

#[test]
fn test_tie_keeps_earlier_entry() {
    let mut first = loc("/dup");
    first.autoindex = true;
    let second = loc("/dup");

    let locations = vec![first, second];
    let best = match_location(&locations, "/dup/x").unwrap();
    assert!(best.autoindex, "the earlier of two equal prefixes must win");
}

#[test]
fn test_no_match_when_nothing_prefixes() {
    let locations = vec![loc("/api")];
    assert!(match_location(&locations, "/other").is_none());
}

#[test]
fn test_method_gate_helpers() {
    let methods = vec!["GET".to_string(), "POST".to_string()];
    assert!(is_method_allowed(&methods, "GET"));
    assert!(!is_method_allowed(&methods, "DELETE"));
    assert_eq!(allow_header(&methods), "GET, POST");
}

#[test]
fn test_base_dir_get_prefers_path() {
    let mut location = loc("/files");
    location.path = "/srv/files".to_string();
    location.upload_dir = "/srv/up".to_string();

    assert_eq!(
        resolve_base_dir(Some(&location), "./www", false),
        "/srv/files"
    );
    assert_eq!(resolve_base_dir(Some(&location), "./www", true), "/srv/up");
}

#[test]
fn test_base_dir_falls_back_to_other_field() {
    let mut location = loc("/files");
    location.upload_dir = "/srv/up".to_string();
    // GET has no path, falls through to the upload dir
    assert_eq!(resolve_base_dir(Some(&location), "./www", false), "/srv/up");
}

#[test]
fn test_base_dir_derived_from_prefix() {
    let location = loc("/files");
    assert_eq!(
        resolve_base_dir(Some(&location), "./www", false),
        "./www/files"
    );

    let root_location = loc("/");
    assert_eq!(resolve_base_dir(Some(&root_location), "./www", false), "./www");

    assert_eq!(resolve_base_dir(None, "./www", false), "./www");
}

#[test]
fn test_suffix_strips_prefix_and_slash() {
    let location = loc("/upload");
    assert_eq!(resolve_suffix(Some(&location), "/upload/a.bin"), "a.bin");
    assert_eq!(resolve_suffix(Some(&location), "/upload"), "");
    assert_eq!(resolve_suffix(Some(&location), "/upload/sub/x"), "sub/x");
    assert_eq!(resolve_suffix(None, "/plain/file"), "plain/file");
}
