/*!
Shared plumbing for commands that produce structured output.

Both lister and show commands get the same "output formatters" options:

  -f / --format FORMAT   formatter to use (choices are the available
                         formatter names, sorted)
  -c / --column COLUMN   restrict output to these columns; repeatable and
                         matched case-insensitively, original order kept

plus every option the available formatters register themselves.
*/

use anyhow::{Result, bail};
use clap::{Arg, ArgAction, ArgMatches};

use crate::columns::Cell;
use crate::formatters::{Formatter, string_arg, strings_arg};

/// Add `-f/--format` and `-c/--column`.
pub(crate) fn add_output_args(parser: clap::Command, names: &[&'static str], preferred: &str) -> clap::Command {
    let mut choices: Vec<&'static str> = names.to_vec();
    choices.sort_unstable();
    let default = choices
        .iter()
        .find(|c| **c == preferred)
        .or_else(|| choices.first())
        .copied()
        .unwrap_or("table");

    parser
        .next_help_heading("output formatters")
        .arg(
            Arg::new("formatter")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .value_parser(choices)
                .default_value(default)
                .help(format!("the output format, defaults to {default}")),
        )
        .arg(
            Arg::new("columns")
                .short('c')
                .long("column")
                .value_name("COLUMN")
                .action(ArgAction::Append)
                .help("specify the column(s) to include, can be repeated to show multiple columns"),
        )
}

/// The formatter chosen with `-f`, or `default` when the option is absent.
pub(crate) fn choose_formatter<'a, F>(formatters: &'a [Box<F>], args: &ArgMatches, default: &str) -> Result<&'a F>
where
    F: Formatter + ?Sized,
{
    let wanted = string_arg(args, "formatter").unwrap_or_else(|| default.to_string());
    match formatters.iter().find(|f| f.name() == wanted) {
        Some(f) => Ok(f.as_ref()),
        None => bail!("unknown output format '{wanted}'"),
    }
}

/// Indexes of the columns requested with `-c`, `None` when all are wanted.
pub(crate) fn column_selector(columns: &[String], args: &ArgMatches) -> Result<Option<Vec<usize>>> {
    let requested = strings_arg(args, "columns");
    if requested.is_empty() {
        return Ok(None);
    }
    let wanted: Vec<String> = requested.iter().map(|c| c.to_uppercase()).collect();
    let selector: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| wanted.contains(&c.to_uppercase()))
        .map(|(i, _)| i)
        .collect();
    if selector.is_empty() {
        bail!("No recognized column names in {requested:?}. Recognized columns are {columns:?}.");
    }
    Ok(Some(selector))
}

pub(crate) fn select<T: Clone>(values: &[T], selector: &[usize]) -> Vec<T> {
    selector.iter().filter_map(|&i| values.get(i).cloned()).collect()
}

pub(crate) fn select_row(row: &[Cell], selector: Option<&[usize]>) -> Vec<Cell> {
    match selector {
        Some(s) => select(row, s),
        None => row.to_vec(),
    }
}
