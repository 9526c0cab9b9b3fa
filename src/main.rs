use webserv::config::AppConfig;
use webserv::prelude::*;
use webserv::supervisor;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: webserv <config_file_path>");
        std::process::exit(1);
    }

    let config_path = &args[1];
    let config = match AppConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let stop_signal = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || stop_signal.store(true, Ordering::Release)) {
        eprintln!("Failed to install signal handler: {e}");
        std::process::exit(1);
    }

    let code = match worker_index(&args) {
        Some(index) => supervisor::run_worker(&config, index, stop),
        None => {
            config.display_config();
            supervisor::run_supervisor(config_path, &config, stop)
        }
    };
    std::process::exit(code);
}

fn worker_index(args: &[String]) -> Option<usize> {
    let pos = args.iter().position(|arg| arg == "--worker")?;
    args.get(pos + 1)?.parse().ok()
}
