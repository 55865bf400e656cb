//! Merges the filters of two queries and prints the result.
//!
//! ```text
//! cargo run --example merge_queries -- \
//!     "SELECT Id FROM Object WHERE field1 = 'value1' AND field3 = 'value3'" \
//!     "SELECT Id FROM Object WHERE field2 = 'value2' OR field4 = 'value4'" \
//!     OR
//! ```
//!
//! Set `RUST_LOG=wheremerge=trace` to see the parse and merge steps.

use std::{env, error::Error};

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};
use wheremerge::{
    LogicalOp, compose_query,
    format::{FormatFlags, FormatOptions, format_query},
    parse_query,
};

const DEFAULT_FIRST: &str = "SELECT Id FROM Object WHERE field1 = 'value1' AND field3 = 'value3'";
const DEFAULT_SECOND: &str = "SELECT Id FROM Object WHERE field2 = 'value2' OR field4 = 'value4'";

fn init_log() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_level(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_log)
        .init();
}

fn parse_operator(arg: Option<&str>) -> LogicalOp {
    match arg.map(str::to_ascii_uppercase).as_deref() {
        None | Some("AND") => LogicalOp::And,
        Some("OR") => LogicalOp::Or,
        Some(other) => {
            warn!("Unknown operator '{}', falling back to AND.", other);
            LogicalOp::And
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_log();

    let args: Vec<String> = env::args().skip(1).collect();
    let first = args.first().map_or(DEFAULT_FIRST, String::as_str);
    let second = args.get(1).map_or(DEFAULT_SECOND, String::as_str);
    let op = parse_operator(args.get(2).map(String::as_str));

    let mut query = parse_query(first)?;
    let other = parse_query(second)?;
    info!(op = op.as_str(), "merging filters");

    query.merge_where(other.where_clause.as_ref(), op);
    println!("{}", serde_json::to_string_pretty(&query.where_clause)?);

    let merged = compose_query(&query);
    println!("first:  {first}");
    println!("op:     {op}");
    println!("second: {second}");
    println!("merged: {merged}");

    let options = FormatOptions {
        indent: 2,
        flags: FormatFlags::WHERE_OPERATORS_INDENTED | FormatFlags::SUBQUERY_PARENS_OWN_LINE,
    };
    match format_query(&merged, &options) {
        Ok(formatted) => println!("\n{formatted}"),
        Err(e) => tracing::error!("Formatting the merged query failed: {}", e),
    }

    Ok(())
}
