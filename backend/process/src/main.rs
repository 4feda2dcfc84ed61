use std::{path::PathBuf, time::Duration};

use clap::Parser;
use process::{Options, import_file};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// CSV file with a header row
    path: PathBuf,

    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    #[arg(long, env = "AI_ENGINE_URL")]
    ai_engine_url: Option<String>,

    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Delete stored transactions first
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    import_file(&Options {
        path: args.path,
        redis_url: args.redis_url,
        ai_engine_url: args.ai_engine_url,
        ai_engine_timeout: Duration::from_millis(args.timeout_ms),
        clear: args.clear,
    })
    .await?;

    Ok(())
}
