//! Comma-separated output.
//!
//! Quoting follows the usual CSV writer modes: `all`, `minimal` (only fields
//! containing a delimiter, quote or line break), `nonnumeric` (everything but
//! numbers and booleans) and `none` (never quote, backslash-escape instead).
//! Formatted columns are written with their machine-readable text.

use std::io::Write;

use anyhow::{Result, bail};
use clap::{Arg, ArgMatches};
use serde_json::Value;

use super::{Formatter, ListFormatter, string_arg};
use crate::columns::Cell;

const DELIMITER: char = ',';
const QUOTE: char = '"';
const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    All,
    Minimal,
    NonNumeric,
    None,
}

impl QuoteMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(QuoteMode::All),
            "minimal" => Some(QuoteMode::Minimal),
            "nonnumeric" => Some(QuoteMode::NonNumeric),
            "none" => Some(QuoteMode::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn add_argument_group(&self, parser: clap::Command) -> clap::Command {
        parser.next_help_heading("CSV Formatter").arg(
            Arg::new("quote_mode")
                .long("quote")
                .value_parser(["all", "minimal", "none", "nonnumeric"])
                .default_value("nonnumeric")
                .help("when to include quotes, defaults to nonnumeric"),
        )
    }
}

impl ListFormatter for CsvFormatter {
    fn emit_list(
        &self,
        columns: &[String],
        data: &[Vec<Cell>],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()> {
        let mode_name = string_arg(args, "quote_mode").unwrap_or_else(|| "nonnumeric".into());
        let Some(mode) = QuoteMode::parse(&mode_name) else {
            bail!("unknown quote mode '{mode_name}'");
        };
        let header: Vec<Field> = columns.iter().map(|c| Field::text(c)).collect();
        write_row(out, &header, mode)?;
        for row in data {
            let fields: Vec<Field> = row.iter().map(Field::from_cell).collect();
            write_row(out, &fields, mode)?;
        }
        Ok(())
    }
}

struct Field {
    text: String,
    numeric: bool,
}

impl Field {
    fn text(s: &str) -> Self {
        Field {
            text: s.to_string(),
            numeric: false,
        }
    }

    fn from_cell(cell: &Cell) -> Self {
        let numeric = matches!(cell, Cell::Value(Value::Number(_) | Value::Bool(_)));
        Field {
            text: cell.machine_text(),
            numeric,
        }
    }
}

fn write_row(out: &mut dyn Write, fields: &[Field], mode: QuoteMode) -> Result<()> {
    let line: Vec<String> = fields.iter().map(|f| encode(f, mode)).collect::<Result<_>>()?;
    writeln!(out, "{}", line.join(&DELIMITER.to_string()))?;
    Ok(())
}

fn encode(field: &Field, mode: QuoteMode) -> Result<String> {
    let mut quoted = match mode {
        QuoteMode::All => true,
        QuoteMode::NonNumeric => !field.numeric,
        QuoteMode::Minimal | QuoteMode::None => false,
    };
    let mut body = String::with_capacity(field.text.len());
    for c in field.text.chars() {
        let special = matches!(c, DELIMITER | QUOTE | ESCAPE | '\n' | '\r');
        if special {
            if mode == QuoteMode::None {
                body.push(ESCAPE);
            } else if c == QUOTE {
                body.push(QUOTE);
                quoted = true;
            } else if c == ESCAPE {
                body.push(ESCAPE);
            } else {
                quoted = true;
            }
        }
        body.push(c);
    }
    if quoted {
        Ok(format!("{QUOTE}{body}{QUOTE}"))
    } else {
        Ok(body)
    }
}
