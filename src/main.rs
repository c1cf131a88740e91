use midway::config::{self, AppState, Config};
use midway::{logger, server};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config_path = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => "config".to_string(),
        ["--init"] => {
            let path = Path::new("config.toml");
            config::write_default_config(path)?;
            println!("[CONFIG] Wrote default configuration to {}", path.display());
            return Ok(());
        }
        ["--config", path] => (*path).to_string(),
        _ => {
            eprintln!("Usage: midway [--init | --config <path>]");
            std::process::exit(2);
        }
    };

    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg));
    server::run(listener, state).await
}
