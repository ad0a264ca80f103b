use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fluentlite_core::Comparison;
use fluentlite_sqlite::{Database, Result};

#[derive(Debug, Parser)]
#[command(name = "fluentlite")]
#[command(about = "Fluent SQLite querying and schema inspection")]
struct Cli {
    /// Database file path; defaults to $SQLITE_DATABASE with a .db suffix.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a multi-statement SQL script from a file or stdin.
    Exec(ExecArgs),
    /// List user tables.
    Tables,
    /// Print a table's live column map as JSON.
    Columns(ColumnsArgs),
    /// Drop a table if it exists.
    Drop(DropArgs),
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// Script file to execute; reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ColumnsArgs {
    /// Table to introspect.
    table: String,
}

#[derive(Debug, Args)]
struct DropArgs {
    /// Table to drop.
    table: String,
}

fn open_database(path: Option<&PathBuf>) -> Result<Database> {
    match path {
        Some(path) => Database::open(path),
        None => Database::open_env(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let db = open_database(cli.database.as_ref())?;

    match cli.command {
        Command::Exec(args) => {
            let script = match args.file {
                Some(path) => fs::read_to_string(&path).map_err(|e| {
                    fluentlite_sqlite::SqliteError::InvalidInput(format!(
                        "cannot read {}: {e}",
                        path.display()
                    ))
                })?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).map_err(|e| {
                        fluentlite_sqlite::SqliteError::InvalidInput(format!(
                            "cannot read stdin: {e}"
                        ))
                    })?;
                    buf
                }
            };
            db.run_script(&script)?;
            println!("ok");
        }
        Command::Tables => {
            let rows = db
                .table("sqlite_master")
                .select(["name"])
                .where_("type", Comparison::Eq, "table")
                .get()?;
            for row in rows {
                if let fluentlite_core::Value::Text(name) = &row["name"] {
                    if !name.starts_with("sqlite_") {
                        println!("{name}");
                    }
                }
            }
        }
        Command::Columns(args) => {
            let live = db.columns(&args.table).get()?;
            let map: serde_json::Map<String, serde_json::Value> = live
                .iter()
                .map(|col| {
                    (
                        col.name.clone(),
                        serde_json::to_value(col).expect("column info serializes"),
                    )
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&map).expect("map serializes"));
        }
        Command::Drop(args) => {
            db.table(&args.table).drop_table()?;
            println!("dropped {}", args.table);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
