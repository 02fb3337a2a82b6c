use clap::{Parser, Subcommand};
use expense_tracker::cmd::{list::ListCommand, schema::SchemaCommand};

#[derive(Debug, Parser)]
#[command(name = "expense-tracker", version, about = "Track expenses and see which match a filter")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show transactions, marking those that match the given filter
    List(ListCommand),
    /// Print the expected input formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Command::List(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
