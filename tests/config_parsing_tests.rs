use webserv::config::AppConfig;
use webserv::error::WebservError;

fn err_to_str(e: WebservError) -> String {
    format!("{}", e)
}

#[test]
fn test_minimal_server() {
    let src = "server { listen 8080; root ./www; }";
    let config = AppConfig::from_source(src).unwrap();

    assert_eq!(config.servers.len(), 1);
    let server = &config.servers[0];
    assert_eq!(server.host, "0.0.0.0");
    assert_eq!(server.port, 8080);
    assert_eq!(server.root, "./www");
    assert_eq!(server.index_files, vec!["index.html"]);
    assert_eq!(server.client_max_body_size, 1_048_576);
    assert_eq!(server.client_timeout, 60);
}

#[test]
fn test_listen_with_interface() {
    let src = "server { listen 127.0.0.1:9090; root ./www; }";
    let config = AppConfig::from_source(src).unwrap();
    assert_eq!(config.servers[0].host, "127.0.0.1");
    assert_eq!(config.servers[0].port, 9090);
}

#[test]
fn test_size_suffixes() {
    let src = "
        server { listen 8080; root ./a; client_max_body_size 10; }
        server { listen 8081; root ./b; client_max_body_size 2k; }
        server { listen 8082; root ./c; client_max_body_size 3m; }
        server { listen 8083; root ./d; client_max_body_size 1g; }
    ";
    let config = AppConfig::from_source(src).unwrap();
    assert_eq!(config.servers[0].client_max_body_size, 10);
    assert_eq!(config.servers[1].client_max_body_size, 2 * 1024);
    assert_eq!(config.servers[2].client_max_body_size, 3 * 1024 * 1024);
    assert_eq!(config.servers[3].client_max_body_size, 1024 * 1024 * 1024);
}

#[test]
fn test_global_statements_seed_defaults() {
    let src = "
        root ./shared;
        index main.html fallback.html;
        client_timeout 5;
        server { listen 8080; }
        server { listen 8081; root ./own; }
    ";
    let config = AppConfig::from_source(src).unwrap();

    assert_eq!(config.servers[0].root, "./shared");
    assert_eq!(config.servers[0].index_files, vec!["main.html", "fallback.html"]);
    assert_eq!(config.servers[0].client_timeout, 5);

    assert_eq!(config.servers[1].root, "./own");
    assert_eq!(config.servers[1].client_timeout, 5);
}

#[test]
fn test_error_page_mapping() {
    let src = "server { listen 8080; root ./www; error_page 404 ./www/404.html; error_page 500 ./www/oops.html; }";
    let config = AppConfig::from_source(src).unwrap();
    let pages = &config.servers[0].error_pages;
    assert_eq!(pages.get(&404).unwrap(), "./www/404.html");
    assert_eq!(pages.get(&500).unwrap(), "./www/oops.html");
}

#[test]
fn test_location_directives() {
    let src = "
        server {
            listen 8080;
            root ./www;
            location /cgi/ {
                methods get post;
                autoindex on;
                cgi_extensions .py .sh;
                fastcgi_pass 127.0.0.1:9000;
            }
            location /old {
                return 301 /new;
            }
        }
    ";
    let config = AppConfig::from_source(src).unwrap();
    let server = &config.servers[0];
    assert_eq!(server.locations.len(), 2);

    let cgi = &server.locations[0];
    assert_eq!(cgi.location, "/cgi/");
    assert_eq!(cgi.allowed_methods, vec!["GET", "POST"]);
    assert!(cgi.autoindex);
    assert_eq!(cgi.cgi_extensions, vec![".py", ".sh"]);
    assert_eq!(cgi.fastcgi_pass, "127.0.0.1:9000");

    let old = &server.locations[1];
    assert_eq!(old.redirect_code, Some(301));
    assert_eq!(old.redirect_target.as_deref(), Some("/new"));
}

#[test]
fn test_location_directive_aliases() {
    let src = "
        server {
            listen 8080;
            root ./www;
            location /upload {
                allow_methods POST DELETE;
                upload_store ./uploads;
            }
            location /files {
                allowed_methods GET;
                path ./srv/files;
                autoindex true;
            }
        }
    ";
    let config = AppConfig::from_source(src).unwrap();
    let server = &config.servers[0];
    assert_eq!(server.locations[0].allowed_methods, vec!["POST", "DELETE"]);
    assert_eq!(server.locations[0].upload_dir, "./uploads");
    assert_eq!(server.locations[1].path, "./srv/files");
    assert!(server.locations[1].autoindex);
}

#[test]
fn test_default_methods_is_get() {
    let src = "server { listen 8080; root ./www; location /plain { autoindex off; } }";
    let config = AppConfig::from_source(src).unwrap();
    assert_eq!(config.servers[0].locations[0].allowed_methods, vec!["GET"]);
}

#[test]
fn test_comments_both_styles() {
    let src = "
        # hash comment
        server {
            listen 8080; # trailing hash
            root ./www; // trailing slashes
            // full line
        }
    ";
    let config = AppConfig::from_source(src).unwrap();
    assert_eq!(config.servers[0].port, 8080);
    assert_eq!(config.servers[0].root, "./www");
}

#[test]
fn test_missing_semicolon_is_fatal() {
    let err = AppConfig::from_source("server { listen 8080 }").unwrap_err();
    assert!(err_to_str(err).contains("must end with ';'"));
}

#[test]
fn test_unclosed_brace_is_fatal() {
    let err = AppConfig::from_source("server { listen 8080;").unwrap_err();
    assert!(err_to_str(err).contains("never closed"));
}

#[test]
fn test_invalid_port() {
    let err = AppConfig::from_source("server { listen abc; root ./www; }").unwrap_err();
    assert!(err_to_str(err).contains("Invalid port"));

    let err = AppConfig::from_source("server { listen 0; root ./www; }").unwrap_err();
    assert!(err_to_str(err).contains("Invalid port"));
}

#[test]
fn test_duplicate_port_rejected() {
    let src = "
        server { listen 8080; root ./a; }
        server { listen 8080; root ./b; }
    ";
    let err = AppConfig::from_source(src).unwrap_err();
    assert!(err_to_str(err).contains("more than one server"));
}

#[test]
fn test_fastcgi_requires_extensions() {
    let src = "
        server {
            listen 8080;
            root ./www;
            location /cgi/ { fastcgi_pass 127.0.0.1:9000; }
        }
    ";
    let err = AppConfig::from_source(src).unwrap_err();
    assert!(err_to_str(err).contains("without cgi_extensions"));
}

#[test]
fn test_location_prefix_must_start_with_slash() {
    let src = "server { listen 8080; root ./www; location cgi { autoindex on; } }";
    let err = AppConfig::from_source(src).unwrap_err();
    assert!(err_to_str(err).contains("must begin with '/'"));
}

#[test]
fn test_no_server_blocks_is_fatal() {
    let err = AppConfig::from_source("root ./www;").unwrap_err();
    assert!(err_to_str(err).contains("does not define any server"));
}

#[test]
fn test_unknown_directives_are_ignored() {
    let src = "server { listen 8080; root ./www; shiny_new_feature on; }";
    let config = AppConfig::from_source(src).unwrap();
    assert_eq!(config.servers[0].port, 8080);
}
