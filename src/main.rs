// src/main.rs

use herdsman::{cli, load_config, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        tracing::error!(error = %format!("{err:#}"), "herdsman stopped");
        eprintln!("herdsman error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let cfg = load_config(&args)?;
    logging::init_logging(&cfg.logging, args.log_level)?;
    run(&args, &cfg).await
}
