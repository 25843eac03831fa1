//! YAML output through serde_yaml, keys in column order.

use std::io::Write;

use anyhow::Result;
use clap::ArgMatches;
use serde_json::Value;

use super::{Formatter, ListFormatter, SingleFormatter, zip_row};
use crate::columns::Cell;

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &'static str {
        "yaml"
    }
}

impl ListFormatter for YamlFormatter {
    fn emit_list(
        &self,
        columns: &[String],
        data: &[Vec<Cell>],
        out: &mut dyn Write,
        _args: &ArgMatches,
    ) -> Result<()> {
        let items: Vec<Value> = data
            .iter()
            .map(|row| Value::Object(zip_row(columns, row)))
            .collect();
        out.write_all(serde_yaml::to_string(&items)?.as_bytes())?;
        Ok(())
    }
}

impl SingleFormatter for YamlFormatter {
    fn emit_one(
        &self,
        columns: &[String],
        data: &[Cell],
        out: &mut dyn Write,
        _args: &ArgMatches,
    ) -> Result<()> {
        let one = Value::Object(zip_row(columns, data));
        out.write_all(serde_yaml::to_string(&one)?.as_bytes())?;
        Ok(())
    }
}
