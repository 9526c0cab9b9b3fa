use std::collections::HashMap;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SERVER_NAME: &str = "localhost";
pub const DEFAULT_ROOT: &str = "./www";
pub const DEFAULT_INDEX: &str = "index.html";
pub const DEFAULT_MAX_BODY_SIZE: usize = 1_048_576; // 1MB
pub const DEFAULT_CLIENT_TIMEOUT: u64 = 60; // seconds

/// One virtual server: one worker process, one listening port.
/// Built once at startup, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub server_name: String,
    pub root: String,
    pub index_files: Vec<String>,
    pub error_pages: HashMap<u16, String>,
    pub client_max_body_size: usize, // 0 = unlimited
    pub client_timeout: u64,         // seconds
    pub locations: Vec<LocationConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            root: DEFAULT_ROOT.to_string(),
            index_files: vec![DEFAULT_INDEX.to_string()],
            error_pages: HashMap::new(),
            client_max_body_size: DEFAULT_MAX_BODY_SIZE,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            locations: Vec::new(),
        }
    }
}

/// Per-URI-prefix behavior. `path` empty means the filesystem base is
/// derived from the server root and the prefix.
#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub location: String,
    pub path: String,
    pub allowed_methods: Vec<String>,
    pub autoindex: bool,
    pub upload_dir: String,
    pub cgi_extensions: Vec<String>,
    pub cgi_path: String,
    pub fastcgi_pass: String,
    pub redirect_code: Option<u16>,
    pub redirect_target: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            location: "/".to_string(),
            path: String::new(),
            allowed_methods: vec!["GET".to_string()],
            autoindex: false,
            upload_dir: String::new(),
            cgi_extensions: Vec::new(),
            cgi_path: String::new(),
            fastcgi_pass: String::new(),
            redirect_code: None,
            redirect_target: None,
        }
    }
}
