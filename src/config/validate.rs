use crate::config::types::ServerConfig;
use crate::error::Result;
use std::collections::HashSet;
use weblog::warn;

/// Rejects configurations the workers could not serve correctly. Soft
/// problems (a root directory that does not exist yet) are warnings only.
pub fn validate_configs(servers: Vec<ServerConfig>) -> Result<Vec<ServerConfig>> {
    let mut seen_ports: HashSet<u16> = HashSet::new();

    for server in &servers {
        if server.root.is_empty() {
            return Err(format!("Server '{}' has an empty root", server.server_name).into());
        }

        if !seen_ports.insert(server.port) {
            return Err(format!(
                "Port {} is bound by more than one server block",
                server.port
            )
            .into());
        }

        for (code, page) in &server.error_pages {
            if *code < 100 || *code > 599 {
                return Err(format!(
                    "Server '{}': error page code {} must be between 100 and 599",
                    server.server_name, code
                )
                .into());
            }
            if std::fs::metadata(page).is_err() {
                warn!(
                    "Server '{}': error page '{}' for code {} is not readable yet",
                    server.server_name, page, code
                );
            }
        }

        for location in &server.locations {
            if !location.location.starts_with('/') {
                return Err(format!(
                    "Server '{}': location prefix '{}' must begin with '/'",
                    server.server_name, location.location
                )
                .into());
            }
            if !location.fastcgi_pass.is_empty() && location.cgi_extensions.is_empty() {
                return Err(format!(
                    "Server '{}': location '{}' sets fastcgi_pass without cgi_extensions",
                    server.server_name, location.location
                )
                .into());
            }
        }

        if std::fs::read_dir(&server.root).is_err() {
            warn!(
                "Server '{}': root directory '{}' is not readable yet",
                server.server_name, server.root
            );
        }
    }

    Ok(servers)
}
