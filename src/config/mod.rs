pub mod display;
pub mod types;
pub mod validate;

pub use types::*;

use crate::error::Result;
use parser::{Block, Item, Statement};
use std::fs;
use weblog::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub servers: Vec<ServerConfig>,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<AppConfig> {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("Unable to open config file '{path}': {e}"))?;
        Self::from_source(&source)
    }

    /// Global statements seed a defaults record; each `server { }` block
    /// starts from those defaults and overrides what it names.
    pub fn from_source(source: &str) -> Result<AppConfig> {
        let items = parser::parse(source)?;

        let mut defaults = ServerConfig::default();
        let mut servers = Vec::new();

        for item in &items {
            match item {
                Item::Statement(stmt) => apply_server_statement(&mut defaults, stmt)?,
                Item::Block(block) if block.name == "server" => {
                    servers.push(build_server(block, &defaults)?);
                }
                Item::Block(block) => {
                    warn!("Unknown top-level block '{}' at {}", block.name, block.loc);
                }
            }
        }

        if servers.is_empty() {
            return Err("Config file does not define any server blocks".into());
        }

        let servers = validate::validate_configs(servers)?;
        Ok(AppConfig { servers })
    }
}

fn build_server(block: &Block, defaults: &ServerConfig) -> Result<ServerConfig> {
    let mut server = defaults.clone();
    server.locations.clear();

    for item in &block.items {
        match item {
            Item::Statement(stmt) => apply_server_statement(&mut server, stmt)?,
            Item::Block(loc_block) if loc_block.name == "location" => {
                let prefix = loc_block.args.first().ok_or_else(|| {
                    format!("Location block at {} requires a path", loc_block.loc)
                })?;
                server.locations.push(build_location(loc_block, prefix)?);
            }
            Item::Block(other) => {
                warn!("Unknown block '{}' at {}", other.name, other.loc);
            }
        }
    }

    if server.root.is_empty() {
        return Err(format!("Server block at {} missing root directive", block.loc).into());
    }
    Ok(server)
}

fn apply_server_statement(server: &mut ServerConfig, stmt: &Statement) -> Result<()> {
    let args = &stmt.args;
    match (stmt.name.as_str(), args.len()) {
        ("listen", 1..) => {
            let (host, port) = parse_listen(&args[0]).map_err(|e| at(stmt, &e))?;
            server.host = host;
            server.port = port;
        }
        ("server_name", 1..) => server.server_name = args[0].clone(),
        ("root", 1..) => server.root = args[0].clone(),
        ("index", 1..) => server.index_files = args.clone(),
        ("error_page", 2..) => {
            let code: u16 = args[0]
                .parse()
                .map_err(|_| at(stmt, &format!("Invalid status code '{}'", args[0])))?;
            server.error_pages.insert(code, args[1].clone());
        }
        ("client_max_body_size" | "max_client_body_size", 1..) => {
            server.client_max_body_size = parse_size(&args[0]).map_err(|e| at(stmt, &e))?;
        }
        ("client_timeout", 1..) => {
            server.client_timeout = args[0]
                .parse()
                .map_err(|_| at(stmt, &format!("Invalid timeout '{}'", args[0])))?;
        }
        _ => warn!("Unknown server directive '{}' at {}", stmt.name, stmt.loc),
    }
    Ok(())
}

fn build_location(block: &Block, prefix: &str) -> Result<LocationConfig> {
    let mut location = LocationConfig {
        location: prefix.to_string(),
        allowed_methods: Vec::new(),
        ..LocationConfig::default()
    };

    for item in &block.items {
        let stmt = match item {
            Item::Statement(stmt) => stmt,
            Item::Block(inner) => {
                warn!("Unknown nested block '{}' at {}", inner.name, inner.loc);
                continue;
            }
        };

        let args = &stmt.args;
        match (stmt.name.as_str(), args.len()) {
            ("path" | "root", 1..) => location.path = args[0].clone(),
            ("methods" | "allow_methods" | "allowed_methods", 1..) => {
                location.allowed_methods = args.iter().map(|m| m.to_uppercase()).collect();
            }
            ("autoindex", 1..) => location.autoindex = parse_bool(&args[0]),
            ("upload_store" | "upload_dir", 1..) => location.upload_dir = args[0].clone(),
            ("cgi_extension" | "cgi_extensions", 1..) => {
                location.cgi_extensions = args.clone();
            }
            ("cgi_path", 1..) => location.cgi_path = args[0].clone(),
            ("fastcgi_pass", 1..) => location.fastcgi_pass = args[0].clone(),
            ("return", 2..) => {
                let code: u16 = args[0]
                    .parse()
                    .map_err(|_| at(stmt, &format!("Invalid return code '{}'", args[0])))?;
                location.redirect_code = Some(code);
                location.redirect_target = Some(args[1].clone());
            }
            _ => warn!("Unknown location directive '{}' at {}", stmt.name, stmt.loc),
        }
    }

    if location.allowed_methods.is_empty() {
        location.allowed_methods.push("GET".to_string());
    }
    Ok(location)
}

fn at(stmt: &Statement, msg: &str) -> String {
    format!("{msg} at {}", stmt.loc)
}

/// `listen 8080;` binds every interface; `listen 127.0.0.1:8080;` binds one.
fn parse_listen(token: &str) -> std::result::Result<(String, u16), String> {
    let (host, port_part) = match token.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port),
        None => (DEFAULT_HOST.to_string(), token),
    };
    let port: u16 = port_part
        .parse()
        .map_err(|_| format!("Invalid port value '{token}'"))?;
    if port == 0 {
        return Err(format!("Invalid port value '{token}'"));
    }
    Ok((host, port))
}

fn parse_size(token: &str) -> std::result::Result<usize, String> {
    if token.is_empty() {
        return Err("Empty size value".to_string());
    }

    let (number, multiplier) = match token.chars().last() {
        Some(c) if c.is_ascii_digit() => (token, 1usize),
        Some('k') | Some('K') => (&token[..token.len() - 1], 1024),
        Some('m') | Some('M') => (&token[..token.len() - 1], 1024 * 1024),
        Some('g') | Some('G') => (&token[..token.len() - 1], 1024 * 1024 * 1024),
        _ => return Err(format!("Unknown size suffix in '{token}'")),
    };

    let value: usize = number
        .parse()
        .map_err(|_| format!("Invalid numeric value '{token}'"))?;
    Ok(value * multiplier)
}

fn parse_bool(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "on" | "true" | "1"
    )
}
