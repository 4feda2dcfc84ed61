//! CSV import into the transactions table.
//!
//! When an enrichment service is configured the raw file is posted to it
//! first and its `processed_data` rows are used. Any failure on that path
//! (transport, status, shape) drops back to the plain positional parser.
use std::time::Duration;

use ledger::{
    LedgerError,
    transaction::{self, Transaction},
};
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{Repository, StoreError};

const PROCESS_PATH: &str = "/api/csv/process-csv";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File is empty")]
    Empty,

    #[error("Only CSV files are allowed")]
    NotCsv,

    #[error("File is not valid UTF-8")]
    NotUtf8,

    #[error(transparent)]
    Row(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(StatusCode),

    #[error("Response has no processed_data rows")]
    MissingRows,
}

pub struct Enrichment {
    client: Client,
    endpoint: String,
}

impl Enrichment {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{PROCESS_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub async fn process(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Map<String, Value>>, EnrichmentError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        if response.status() != StatusCode::OK {
            return Err(EnrichmentError::Status(response.status()));
        }

        let body: Value = response.json().await?;
        let rows = body
            .get("processed_data")
            .and_then(Value::as_array)
            .ok_or(EnrichmentError::MissingRows)?;

        Ok(rows.iter().filter_map(Value::as_object).cloned().collect())
    }
}

/// Rejects empty uploads and anything not named `*.csv`.
pub fn check_upload(file_name: Option<&str>, bytes: &[u8]) -> Result<(), ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }

    match file_name {
        Some(name) if name.ends_with(".csv") => Ok(()),
        _ => Err(ImportError::NotCsv),
    }
}

/// Parses the file and saves every row in one batch. Returns the row count.
pub async fn import_csv(
    repo: &Repository<Transaction>,
    enrichment: Option<&Enrichment>,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<usize, ImportError> {
    let transactions = parse_upload(enrichment, file_name, bytes).await?;

    let saved = repo.insert_many(transactions).await?;
    info!("Imported {} transactions from {file_name}", saved.len());

    Ok(saved.len())
}

/// Turns an uploaded file into unsaved transactions, preferring the
/// enrichment service when one is given.
pub async fn parse_upload(
    enrichment: Option<&Enrichment>,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<Vec<Transaction>, ImportError> {
    let enriched = match enrichment {
        Some(service) => match service.process(file_name, bytes.clone()).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!("CSV enrichment failed, parsing {file_name} directly: {e}");
                None
            }
        },
        None => None,
    };

    match enriched {
        Some(rows) => Ok(from_enriched(&rows)),
        None => {
            let text = String::from_utf8(bytes).map_err(|_| ImportError::NotUtf8)?;
            Ok(transaction::parse_csv(&text)?)
        }
    }
}

fn from_enriched(rows: &[Map<String, Value>]) -> Vec<Transaction> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match transaction::from_enriched_row(row) {
            Ok(tx) => Some(tx),
            Err(e) => {
                debug!("Skipping enriched row {index}: {e}");
                None
            }
        })
        .collect()
}
