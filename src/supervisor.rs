use crate::config::AppConfig;
use crate::fastcgi::backend;
use crate::prelude::*;
use crate::server::Worker;
use std::process::{Child, Command};

// longer than the worker poll quantum so an idle worker can notice the flag
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
const REAP_INTERVAL: Duration = Duration::from_millis(100);

struct WorkerProcess {
    child: Child,
    port: u16,
    name: String,
}

/// Spawns one worker process per server entry by re-executing this binary
/// with `--worker <index>`, then reaps them until all are gone.
pub fn run_supervisor(config_path: &str, config: &AppConfig, stop: Arc<AtomicBool>) -> i32 {
    backend::ensure_backends_running(&config.servers);
    info!("Launching {} server instance(s)", config.servers.len());

    let exe = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            error!("Cannot locate own executable: {}", e);
            return 1;
        }
    };

    let mut children: Vec<WorkerProcess> = Vec::new();
    for (index, server) in config.servers.iter().enumerate() {
        let spawned = Command::new(&exe)
            .arg(config_path)
            .arg("--worker")
            .arg(index.to_string())
            .spawn();

        match spawned {
            Ok(child) => {
                info!(
                    "Spawned server PID {} on port {} ({})",
                    child.id(),
                    server.port,
                    server.server_name
                );
                children.push(WorkerProcess {
                    child,
                    port: server.port,
                    name: server.server_name.clone(),
                });
            }
            Err(e) => error!("Failed to spawn worker for port {}: {}", server.port, e),
        }
    }

    if children.is_empty() {
        error!("No worker could be spawned");
        return 1;
    }

    monitor_children(&mut children, &stop);
    info!("All server processes stopped cleanly");
    0
}

fn monitor_children(children: &mut Vec<WorkerProcess>, stop: &AtomicBool) {
    let mut term_broadcast: Option<Instant> = None;

    while !children.is_empty() {
        if stop.load(Ordering::Acquire) && term_broadcast.is_none() {
            info!("Termination requested, stopping all servers...");
            for worker in children.iter() {
                signal(worker, libc::SIGTERM);
            }
            term_broadcast = Some(Instant::now());
        }

        children.retain_mut(|worker| {
            let pid = worker.child.id();
            match worker.child.try_wait() {
                Ok(Some(status)) => {
                    info!(
                        "Server PID {} ({}:{}) exited with {}",
                        pid, worker.name, worker.port, status
                    );
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    warn!("wait on PID {} failed: {}", pid, e);
                    false
                }
            }
        });

        // a worker that ignored SIGTERM gets the non-negotiable version
        if let Some(since) = term_broadcast {
            if since.elapsed() > SHUTDOWN_GRACE && !children.is_empty() {
                for worker in children.iter() {
                    warn!("Worker PID {} unresponsive, killing", worker.child.id());
                    signal(worker, libc::SIGKILL);
                }
                term_broadcast = Some(Instant::now());
            }
        }

        std::thread::sleep(REAP_INTERVAL);
    }
}

fn signal(worker: &WorkerProcess, signal: i32) {
    unsafe {
        libc::kill(worker.child.id() as libc::pid_t, signal);
    }
}

pub fn run_worker(config: &AppConfig, index: usize, stop: Arc<AtomicBool>) -> i32 {
    let Some(server_config) = config.servers.get(index) else {
        error!("No server entry at index {}", index);
        return 1;
    };

    let mut worker = match Worker::new(server_config.clone(), stop) {
        Ok(worker) => worker,
        Err(e) => {
            error!(
                "Failed to init server on port {}: {}",
                server_config.port, e
            );
            return 1;
        }
    };

    print_banner(server_config);
    match worker.run() {
        Ok(()) => {
            info!(
                "Server shutdown finished successfully (port {})",
                server_config.port
            );
            0
        }
        Err(e) => {
            error!("Worker on port {} failed: {}", server_config.port, e);
            1
        }
    }
}

fn print_banner(config: &ServerConfig) {
    info!("Server initialized successfully");
    info!("Open in your browser:");
    info!("  -> http://127.0.0.1:{}/", config.port);
    info!("  -> http://localhost:{}/", config.port);
    info!("Serving root: {}", config.root);
}
