//! # Transaction Import
//!
//! Offline counterpart of `POST /api/data/upload-csv`.
//!
//! The file goes through the same pipeline as an upload (enrichment service
//! when given, positional parser otherwise) and is then written to the store
//! in fixed size batches so progress can be reported.
//!
//! Without a Redis URL the rows land in a throwaway in-memory store, which is
//! useful to validate a file before importing it for real.
use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ledger::transaction::Transaction;
use server::{
    database::RedisStore,
    import::{Enrichment, check_upload, parse_upload},
    store::{MemoryStore, Repository, Store},
};

pub const BATCH_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct Options {
    pub path: PathBuf,
    pub redis_url: Option<String>,
    pub ai_engine_url: Option<String>,
    pub ai_engine_timeout: Duration,
    pub clear: bool,
}

/// Imports one file and returns the number of saved rows.
pub async fn import_file(options: &Options) -> Result<usize> {
    let file_name = options
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string);
    let bytes = tokio::fs::read(&options.path)
        .await
        .with_context(|| format!("Failed to read {}", options.path.display()))?;
    check_upload(file_name.as_deref(), &bytes)?;
    let file_name = file_name.unwrap_or_default();

    let store: Arc<dyn Store> = match &options.redis_url {
        Some(url) => Arc::new(RedisStore::connect(url).await?),
        None => {
            println!("No Redis URL given, validating into memory only.\n");
            Arc::new(MemoryStore::new())
        }
    };
    let repo = Repository::<Transaction>::new(store);

    if options.clear {
        let existing = repo.count().await?;
        repo.clear().await?;
        println!("Cleared Transactions: {existing}");
    }

    let enrichment = options
        .ai_engine_url
        .as_deref()
        .map(|url| Enrichment::new(url, options.ai_engine_timeout))
        .transpose()?;

    let transactions = parse_upload(enrichment.as_ref(), &file_name, bytes).await?;
    println!("Parsed Transactions: {}\n", transactions.len());

    let saved = save(&repo, transactions).await?;

    println!("\nTotal Imported: {saved}");
    println!("Stored Verification: {}", repo.count().await?);

    Ok(saved)
}

async fn save(repo: &Repository<Transaction>, transactions: Vec<Transaction>) -> Result<usize> {
    let pb = ProgressBar::new(transactions.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut saved = 0;
    let mut rows = transactions.into_iter().peekable();

    while rows.peek().is_some() {
        let batch: Vec<Transaction> = rows.by_ref().take(BATCH_SIZE).collect();
        pb.set_message(format!("Saving rows {}..{}", saved + 1, saved + batch.len()));

        let written = repo.insert_many(batch).await?.len();
        saved += written;

        pb.inc(written as u64);
    }

    pb.finish_with_message("Done");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(name: &str, content: &str) -> Options {
        let path = std::env::temp_dir().join(format!("{}-{name}", std::process::id()));
        std::fs::write(&path, content).expect("write fixture");

        Options {
            path,
            redis_url: None,
            ai_engine_url: None,
            ai_engine_timeout: Duration::from_millis(100),
            clear: false,
        }
    }

    #[tokio::test]
    async fn test_import_into_memory() {
        let mut csv = String::from("Date,Customer,TransactionType,Revenue,Cost,Product,OrderStatus,Department,Profit,ForecastedRevenue\n");
        for day in 1..=(BATCH_SIZE + 3) {
            csv.push_str(&format!("2025-01-01,C{day},Sale,10,4,Widget,Completed,Sales,6,0\n"));
        }
        let options = options("batches.csv", &csv);

        let saved = import_file(&options).await.expect("import");

        assert_eq!(saved, BATCH_SIZE + 3);
    }

    #[tokio::test]
    async fn test_rejects_non_csv_name() {
        let options = options("sales.txt", "Date\n");

        assert!(import_file(&options).await.is_err());
    }
}
