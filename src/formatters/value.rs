//! Bare values, no names: handy for `$(app show thing -f value -c id)`.

use std::io::Write;

use anyhow::Result;
use clap::ArgMatches;

use super::{Formatter, ListFormatter, SingleFormatter};
use crate::columns::Cell;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFormatter;

impl Formatter for ValueFormatter {
    fn name(&self) -> &'static str {
        "value"
    }
}

impl ListFormatter for ValueFormatter {
    fn emit_list(
        &self,
        _columns: &[String],
        data: &[Vec<Cell>],
        out: &mut dyn Write,
        _args: &ArgMatches,
    ) -> Result<()> {
        for row in data {
            let line: Vec<String> = row.iter().map(Cell::machine_text).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl SingleFormatter for ValueFormatter {
    fn emit_one(
        &self,
        _columns: &[String],
        data: &[Cell],
        out: &mut dyn Write,
        _args: &ArgMatches,
    ) -> Result<()> {
        for cell in data {
            writeln!(out, "{}", cell.machine_text())?;
        }
        Ok(())
    }
}
