pub mod list;
pub mod schema;

use crate::transaction::{self, Transaction};
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Format of a transactions input
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// CSV for a `.csv` extension (any case), JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Json,
        }
    }

    pub fn parse<R: Read>(self, reader: R) -> anyhow::Result<Vec<Transaction>> {
        match self {
            InputFormat::Json => transaction::read_transactions_json(reader),
            InputFormat::Csv => transaction::read_transactions_csv(reader),
        }
    }
}

/// Read transactions from a file, or from stdin with "-".
///
/// Without an explicit `format`, files are detected by extension and stdin is
/// read as JSON.
pub fn read_transactions(
    path: &Path,
    format: Option<InputFormat>,
) -> anyhow::Result<Vec<Transaction>> {
    if path.as_os_str() == "-" {
        let format = format.unwrap_or(InputFormat::Json);
        log::info!("Reading {:?} transactions from stdin", format);

        let mut input = String::new();
        io::stdin().lock().read_to_string(&mut input)?;
        if input.trim().is_empty() {
            anyhow::bail!("Nothing on stdin. Pass a transactions file or pipe JSON or CSV in.");
        }
        format.parse(input.as_bytes())
    } else {
        let format = format.unwrap_or_else(|| InputFormat::from_path(path));
        log::info!("Reading {:?} transactions from {}", format, path.display());
        format.parse(BufReader::new(File::open(path)?))
    }
}
