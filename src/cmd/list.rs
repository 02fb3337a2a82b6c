//! List command - load transactions into the model and show them, marking
//! the ones that match the requested filter

use crate::cmd::{read_transactions, InputFormat};
use crate::filter::{apply_filter, AllOf, AmountFilter, CategoryFilter, TransactionFilter};
use crate::model::{ExpenseTrackerModel, ModelListener};
use crate::transaction::{Category, TransactionRecord};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Transactions file, or "-" for stdin
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Input format. Defaults to the file extension, or JSON for stdin
    #[arg(short, long, value_enum)]
    input_format: Option<InputFormat>,

    /// Match transactions in this category
    #[arg(short, long, value_enum)]
    category: Option<CategoryArg>,

    /// Match transactions of at least this amount
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// Match transactions of at most this amount
    #[arg(long)]
    max_amount: Option<Decimal>,

    /// Only show transactions matching the filter
    #[arg(long)]
    matched_only: bool,

    /// Output as CSV instead of formatted table
    #[arg(long, conflicts_with = "json")]
    csv: bool,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Food,
    Travel,
    Bills,
    Entertainment,
    Other,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Food => Category::Food,
            CategoryArg::Travel => Category::Travel,
            CategoryArg::Bills => Category::Bills,
            CategoryArg::Entertainment => Category::Entertainment,
            CategoryArg::Other => Category::Other,
        }
    }
}

/// Logs every model notification.
#[derive(Default)]
struct ChangeLogger {
    updates: Cell<usize>,
}

impl ModelListener for ChangeLogger {
    fn update(&self, model: &ExpenseTrackerModel) -> anyhow::Result<()> {
        let update = self.updates.get() + 1;
        self.updates.set(update);
        log::debug!(
            "Model update {}: {} transactions, {} matched",
            update,
            model.transaction_count(),
            model.matched_filter_indices().len()
        );
        Ok(())
    }
}

impl ListCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = read_transactions(&self.file, self.input_format)?;
        let filter = self.filter()?;

        let logger = Rc::new(ChangeLogger::default());
        let mut model = ExpenseTrackerModel::new();
        model.register(logger.clone());

        for transaction in transactions {
            model.add_transaction(transaction)?;
        }
        if let Some(filter) = &filter {
            apply_filter(&mut model, filter)?;
        }
        log::info!(
            "Loaded {} transactions ({} model updates)",
            model.transaction_count(),
            logger.updates.get()
        );
        if model.is_empty() {
            log::warn!("No transactions in {}", self.file.display());
        }

        let matched_only = self.matched_only && filter.is_some();
        let rows = build_rows(&model, filter.is_some(), matched_only);

        if self.json {
            self.print_json(&model, matched_only)
        } else if self.csv {
            self.write_csv(&rows)
        } else {
            self.print_table(rows, &model, matched_only);
            Ok(())
        }
    }

    fn filter(&self) -> anyhow::Result<Option<AllOf>> {
        let mut filters: Vec<Box<dyn TransactionFilter>> = Vec::new();
        if let Some(category) = self.category {
            filters.push(Box::new(CategoryFilter(category.into())));
        }
        if self.min_amount.is_some() || self.max_amount.is_some() {
            filters.push(Box::new(AmountFilter::new(self.min_amount, self.max_amount)?));
        }
        Ok((!filters.is_empty()).then_some(AllOf(filters)))
    }

    fn print_table(
        &self,
        mut rows: Vec<TransactionRow>,
        model: &ExpenseTrackerModel,
        matched_only: bool,
    ) {
        if rows.is_empty() {
            println!("No transactions found");
            return;
        }

        rows.push(total_row("Total", shown_total(model, matched_only)));
        if matched_only {
            rows.push(total_row("All transactions", model.total_cost()));
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[TransactionRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn print_json(&self, model: &ExpenseTrackerModel, matched_only: bool) -> anyhow::Result<()> {
        let transactions = model
            .transactions()
            .iter()
            .enumerate()
            .filter(|(i, _)| !matched_only || model.is_matched(*i))
            .map(|(_, t)| TransactionRecord::from(t))
            .collect();

        let output = ListOutput {
            transactions,
            matched_filter_indices: model.matched_filter_indices(),
            total: format!("{:.2}", shown_total(model, matched_only)),
            all_transactions_total: format!("{:.2}", model.total_cost()),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

/// Row for the transactions table output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TransactionRow {
    #[tabled(rename = "#")]
    #[serde(rename = "row_num")]
    pub row_num: String,

    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "Category")]
    pub category: String,

    #[tabled(rename = "Amount")]
    pub amount: String,

    #[tabled(rename = "Matched")]
    pub matched: String,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    transactions: Vec<TransactionRecord>,
    matched_filter_indices: Vec<usize>,
    total: String,
    all_transactions_total: String,
}

/// Total of the transactions being shown.
fn shown_total(model: &ExpenseTrackerModel, matched_only: bool) -> Decimal {
    if matched_only {
        model.matched_total_cost()
    } else {
        model.total_cost()
    }
}

fn total_row(label: &str, amount: Decimal) -> TransactionRow {
    TransactionRow {
        row_num: String::new(),
        date: label.to_string(),
        category: String::new(),
        amount: format!("{:.2}", amount),
        matched: String::new(),
    }
}

fn build_rows(
    model: &ExpenseTrackerModel,
    filtered: bool,
    matched_only: bool,
) -> Vec<TransactionRow> {
    model
        .transactions()
        .iter()
        .enumerate()
        .filter(|(i, _)| !matched_only || model.is_matched(*i))
        .map(|(i, t)| TransactionRow {
            row_num: (i + 1).to_string(),
            date: t.timestamp().format("%Y-%m-%d %H:%M").to_string(),
            category: t.category().to_string(),
            amount: format!("{:.2}", t.amount()),
            matched: if filtered && model.is_matched(i) {
                "\u{2713}".to_string()
            } else {
                String::new()
            },
        })
        .collect()
}
