use std::{fmt::Write as _, fs, path::PathBuf};

use anyhow::Context;
use chrono::{Duration, Local};
use clap::Parser;
use ledger::transaction::CSV_COLUMNS;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

const CUSTOMERS: [&str; 6] = ["An", "Binh", "Chi", "Dung", "Hoa", "Khanh"];
const PRODUCTS: [&str; 6] = [
    "Laptop Pro",
    "Laptop Air",
    "Phone X",
    "Phone Mini",
    "Office Chair",
    "Desk Lamp",
];
const DEPARTMENTS: [&str; 3] = ["Sales", "Retail", "Online"];
const STATUSES: [&str; 3] = ["Completed", "Pending", "Cancelled"];

/// Writes a sample transactions file for manual upload testing.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(default_value = "../sample.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 200)]
    rows: usize,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let today = Local::now().date_naive();

    let mut csv = CSV_COLUMNS.join(",");
    csv.push('\n');

    for _ in 0..args.rows {
        let date = today - Duration::days(rng.gen_range(0..365));
        let revenue: u32 = rng.gen_range(100..5_000);
        let cost = revenue * rng.gen_range(30..90) / 100;
        let forecast = revenue * rng.gen_range(90..130) / 100;

        writeln!(
            csv,
            "{date},{},Sale,{revenue},{cost},{},{},{},{},{forecast}",
            CUSTOMERS.choose(&mut rng).copied().unwrap_or_default(),
            PRODUCTS.choose(&mut rng).copied().unwrap_or_default(),
            STATUSES.choose(&mut rng).copied().unwrap_or_default(),
            DEPARTMENTS.choose(&mut rng).copied().unwrap_or_default(),
            revenue - cost,
        )?;
    }

    fs::write(&args.output, csv)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Rows written: {}", args.rows);
    println!("Output: {}", args.output.display());

    Ok(())
}
