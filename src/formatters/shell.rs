//! `name="value"` lines a POSIX shell can `eval`.

use std::io::Write;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches};

use super::{Formatter, SingleFormatter, string_arg, strings_arg};
use crate::columns::Cell;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellFormatter;

impl Formatter for ShellFormatter {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn add_argument_group(&self, parser: clap::Command) -> clap::Command {
        parser
            .next_help_heading("shell formatter")
            .arg(
                Arg::new("variables")
                    .long("variable")
                    .value_name("VARIABLE")
                    .action(ArgAction::Append)
                    .help("specify the variable(s) to include, can be repeated"),
            )
            .arg(
                Arg::new("prefix")
                    .long("prefix")
                    .default_value("")
                    .help("add a prefix to all variable names"),
            )
    }
}

impl SingleFormatter for ShellFormatter {
    fn emit_one(
        &self,
        columns: &[String],
        data: &[Cell],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()> {
        let desired = strings_arg(args, "variables");
        let prefix = string_arg(args, "prefix").unwrap_or_default();
        for (column, cell) in columns.iter().zip(data) {
            let name = column.to_lowercase().replace(' ', "_");
            if !desired.is_empty() && !desired.contains(&name) {
                continue;
            }
            // colons and dashes show up in resource properties but are not
            // valid in shell variable names
            let name = name.replace([':', '-'], "_");
            let value = cell.machine_text().replace('"', "\\\"");
            writeln!(out, "{prefix}{name}=\"{value}\"")?;
        }
        Ok(())
    }
}
