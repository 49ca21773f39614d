//! Sheetbase CLI - use an XLSX workbook as a small table database

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheetbase::prelude::*;
use sheetbase::{DEFAULT_PREVIEW_ROWS, DEFAULT_SHEET};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetbase")]
#[command(
    author,
    version,
    about = "Create, inspect and edit tables stored in XLSX workbooks"
)]
struct Cli {
    /// Directory holding workbook files (default: $SHEETBASE_DATA_DIR or ./data)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a workbook with one sheet holding an empty ID column
    Create {
        /// Workbook name (.xlsx is appended when missing)
        name: String,

        /// Name of the sheet to create
        #[arg(short, long, default_value = DEFAULT_SHEET)]
        sheet: String,
    },

    /// List the tables of a workbook
    Tables {
        /// Workbook file under the data directory
        file: String,
    },

    /// Show row count, column count and columns of a table
    Describe { file: String, table: String },

    /// Print the first rows of a table
    Preview {
        file: String,
        table: String,

        /// Number of rows (negative values show none)
        #[arg(short = 'n', long = "rows", default_value_t = DEFAULT_PREVIEW_ROWS as i64, allow_negative_numbers = true)]
        rows: i64,
    },

    /// Append a row given as COLUMN=VALUE pairs covering every column
    AddRow {
        file: String,
        table: String,

        #[arg(value_name = "COLUMN=VALUE", allow_hyphen_values = true)]
        cells: Vec<String>,
    },

    /// Add a column, filled with a default value
    AddColumn {
        file: String,
        table: String,
        name: String,

        /// Value for every existing row (default: empty)
        #[arg(short, long, allow_hyphen_values = true)]
        default: Option<String>,
    },

    /// Replace the value of one cell
    Update {
        file: String,
        table: String,
        row: usize,
        column: String,

        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Rename a column
    RenameColumn {
        file: String,
        table: String,
        old: String,
        new: String,
    },

    /// Delete a row; later rows move up by one
    DropRow {
        file: String,
        table: String,
        row: usize,
    },

    /// Delete a column
    DropColumn {
        file: String,
        table: String,
        name: String,
    },

    /// Print the rows whose column equals a value
    Find {
        file: String,
        table: String,
        column: String,

        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Print one row by position
    Row {
        file: String,
        table: String,
        row: usize,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = cli
        .data_dir
        .map(StorageConfig::new)
        .unwrap_or_else(StorageConfig::from_env);
    let loader = Loader::new(config.clone());

    match cli.command {
        Commands::Create { name, sheet } => {
            let path = Creator::new(config)
                .create_with_sheet(&name, &sheet)
                .with_context(|| format!("Failed to create '{}'", name))?;
            println!("Created {}", path.display());
        }
        Commands::Tables { file } => {
            let db = load(&loader, &file)?;
            for name in db.list_tables() {
                println!("{}", name);
            }
        }
        Commands::Describe { file, table } => {
            let db = load(&loader, &file)?;
            let shape = db.reader().describe(&table)?;
            print_shape(&table, &shape);
        }
        Commands::Preview { file, table, rows } => {
            let db = load(&loader, &file)?;
            print!("{}", db.reader().preview(&table, clamp_rows(rows))?);
        }
        Commands::AddRow { file, table, cells } => {
            let row = parse_cells(&cells)?;
            let mut db = load(&loader, &file)?;
            let mut editor = db.editor(&table)?;
            editor.add_row(row)?;
            save(&editor)?;
            println!("Row added to '{}'", table);
        }
        Commands::AddColumn {
            file,
            table,
            name,
            default,
        } => {
            let default = default.as_deref().map_or(Value::Empty, parse_literal);
            let mut db = load(&loader, &file)?;
            let mut editor = db.editor(&table)?;
            match editor.add_column(&name, default)? {
                Outcome::Applied => {
                    save(&editor)?;
                    println!("Column '{}' added to '{}'", name, table);
                }
                Outcome::Refused(reason) => eprintln!("Nothing changed: {}", reason),
            }
        }
        Commands::Update {
            file,
            table,
            row,
            column,
            value,
        } => {
            let mut db = load(&loader, &file)?;
            let mut editor = db.editor(&table)?;
            let old = editor.update_row(row, &column, parse_literal(&value))?;
            save(&editor)?;
            println!(
                "Row {} column '{}' changed from '{}' to '{}'",
                row, column, old, value
            );
        }
        Commands::RenameColumn {
            file,
            table,
            old,
            new,
        } => {
            let mut db = load(&loader, &file)?;
            let mut editor = db.editor(&table)?;
            match editor.rename_column(&old, &new)? {
                Outcome::Applied => {
                    save(&editor)?;
                    println!("Column '{}' renamed to '{}'", old, new);
                }
                Outcome::Refused(reason) => eprintln!("Nothing changed: {}", reason),
            }
        }
        Commands::DropRow { file, table, row } => {
            let mut db = load(&loader, &file)?;
            let mut editor = db.editor(&table)?;
            editor.drop_row(row)?;
            save(&editor)?;
            println!("Row {} removed from '{}'", row, table);
        }
        Commands::DropColumn { file, table, name } => {
            let mut db = load(&loader, &file)?;
            let mut editor = db.editor(&table)?;
            editor.drop_column(&name)?;
            save(&editor)?;
            println!("Column '{}' removed from '{}'", name, table);
        }
        Commands::Find {
            file,
            table,
            column,
            value,
        } => {
            let mut db = load(&loader, &file)?;
            let found = db
                .editor(&table)?
                .find_by_column(&column, &parse_literal(&value))?;
            if found.is_empty() {
                eprintln!("No rows where '{}' is '{}'", column, value);
            } else {
                print!("{}", found);
            }
        }
        Commands::Row { file, table, row } => {
            let mut db = load(&loader, &file)?;
            print!("{}", db.editor(&table)?.find_by_row(row)?);
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only)
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(loader: &Loader, file: &str) -> Result<Database> {
    loader
        .load(file)
        .with_context(|| format!("Failed to open '{}'", file))
}

fn save(editor: &Editor<'_>) -> Result<()> {
    match editor.save() {
        Ok(()) => Ok(()),
        Err(err @ Error::FileLocked { .. }) => {
            Err(anyhow::Error::new(err).context("Close the workbook in other programs and try again"))
        }
        Err(err) => Err(anyhow::Error::new(err).context("Failed to save changes")),
    }
}

fn print_shape(table: &str, shape: &TableShape) {
    println!("Table: {}", table);
    println!("Rows: {}", shape.row_count);
    println!("Columns: {}", shape.column_count);
    for (name, kind) in shape.column_names.iter().zip(&shape.column_kinds) {
        println!("  {}\t{}", name, kind);
    }
}

/// Preview length from the command line; negative counts show no rows
fn clamp_rows(rows: i64) -> usize {
    usize::try_from(rows.max(0)).unwrap_or(usize::MAX)
}

/// Interpret a command-line literal as a cell value
///
/// `true`/`false` (any case) are booleans, anything that parses as a finite
/// number is a number, the empty string is an empty cell, and everything
/// else is text.
fn parse_literal(text: &str) -> Value {
    if text.is_empty() {
        return Value::Empty;
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::from(text),
    }
}

/// Build a record from `COLUMN=VALUE` arguments
fn parse_cells(cells: &[String]) -> Result<Row> {
    let mut row = Row::new();
    for cell in cells {
        let Some((column, value)) = cell.split_once('=') else {
            bail!("Expected COLUMN=VALUE, got '{}'", cell);
        };
        row.set(column, parse_literal(value));
    }
    Ok(row)
}
