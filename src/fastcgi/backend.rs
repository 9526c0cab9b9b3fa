use crate::prelude::*;
use std::collections::BTreeSet;
use std::net::{Ipv4Addr, TcpStream as ProbeStream};
use std::process::{Command, Stdio};
use std::thread;

const PROBE_TIMEOUT: Duration = Duration::from_millis(200);
const START_RETRIES: u32 = 15;
const RETRY_DELAY: Duration = Duration::from_millis(200);
const HELPER_SCRIPT: &str = "./scripts/start_fcgi_backend.sh";
const DEFAULT_FCGI_PORT: u16 = 9000;

/// Probes every local fastcgi_pass endpoint once at startup and tries the
/// helper script for the ones that are down. Best effort only; a worker
/// answers 504 later if an upstream still is not there.
pub fn ensure_backends_running(servers: &[ServerConfig]) {
    for (host, port) in collect_endpoints(servers) {
        if is_port_open(&host, port) {
            info!("FastCGI backend ready on {}:{}", host, port);
            continue;
        }

        info!(
            "FastCGI backend not reachable on {}:{}, attempting to start...",
            host, port
        );
        start_backend(port);

        if wait_for_backend(&host, port) {
            info!("FastCGI backend started on {}:{}", host, port);
        } else {
            warn!("FastCGI backend still not reachable on {}:{}", host, port);
        }
    }
}

/// Unique local endpoints named by any location. A bare hostname without a
/// port assumes the conventional FastCGI port.
fn collect_endpoints(servers: &[ServerConfig]) -> BTreeSet<(String, u16)> {
    let mut endpoints = BTreeSet::new();

    for server in servers {
        for location in &server.locations {
            if location.fastcgi_pass.is_empty() {
                continue;
            }
            let (host, port) = match location.fastcgi_pass.split_once(':') {
                Some((host, port_part)) => match port_part.parse::<u16>() {
                    Ok(port) if port > 0 => (host.to_string(), port),
                    _ => continue,
                },
                None => (location.fastcgi_pass.clone(), DEFAULT_FCGI_PORT),
            };
            if host != "127.0.0.1" && host != "localhost" && host != "0.0.0.0" {
                continue;
            }
            endpoints.insert((host, port));
        }
    }
    endpoints
}

fn is_port_open(host: &str, port: u16) -> bool {
    let host = if host == "localhost" || host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        host
    };
    let Ok(ip) = host.parse::<Ipv4Addr>() else {
        return false;
    };
    ProbeStream::connect_timeout(&SocketAddr::from((ip, port)), PROBE_TIMEOUT).is_ok()
}

fn start_backend(port: u16) {
    let status = Command::new(HELPER_SCRIPT)
        .arg("start")
        .arg(port.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => {
            info!("Started FastCGI helper for port {}", port);
        }
        Ok(status) => {
            warn!("FastCGI helper failed for port {} ({})", port, status);
        }
        Err(e) => {
            warn!("Could not run {}: {}", HELPER_SCRIPT, e);
        }
    }
}

fn wait_for_backend(host: &str, port: u16) -> bool {
    for _ in 0..START_RETRIES {
        if is_port_open(host, port) {
            return true;
        }
        thread::sleep(RETRY_DELAY);
    }
    false
}
