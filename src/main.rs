mod run;

use anyhow::Result;
use expensetrack::{config::Config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    match args.get(1).map(String::as_str) {
        None | Some("serve") => run::serve(&config).await,
        Some(_) => run::as_cli(&args, &config),
    }
}
