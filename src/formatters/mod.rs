/*!
Output formatters.

A formatter renders the `(columns, rows)` a display command produces. Two
shapes exist:

  - `ListFormatter::emit_list`   : many rows (lister commands)
  - `SingleFormatter::emit_one`  : one record (show commands)

Each formatter may contribute its own options to the command parser via
`add_argument_group`; it reads them back from the parsed `ArgMatches` at
emit time. Option readers in this module tolerate missing ids so a
formatter can also be driven with `ArgMatches::default()`.

Built-ins:
  table  (list + single)
  csv    (list)
  json   (list + single)
  yaml   (list + single)
  shell  (single)
  value  (list + single)
*/

use std::io::Write;

use anyhow::Result;
use clap::ArgMatches;

use crate::columns::Cell;

pub mod csv;
pub mod json;
pub mod shell;
pub mod table;
pub mod value;
pub mod yaml;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use shell::ShellFormatter;
pub use table::TableFormatter;
pub use value::ValueFormatter;
pub use yaml::YamlFormatter;

pub trait Formatter {
    /// Name selectable through `-f/--format`.
    fn name(&self) -> &'static str;

    /// Register this formatter's options on `parser`.
    fn add_argument_group(&self, parser: clap::Command) -> clap::Command {
        parser
    }
}

pub trait ListFormatter: Formatter {
    fn emit_list(
        &self,
        columns: &[String],
        data: &[Vec<Cell>],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()>;
}

pub trait SingleFormatter: Formatter {
    fn emit_one(
        &self,
        columns: &[String],
        data: &[Cell],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()>;
}

pub fn list_formatters() -> Vec<Box<dyn ListFormatter>> {
    vec![
        Box::new(TableFormatter),
        Box::new(CsvFormatter),
        Box::new(JsonFormatter),
        Box::new(ValueFormatter),
        Box::new(YamlFormatter),
    ]
}

pub fn single_formatters() -> Vec<Box<dyn SingleFormatter>> {
    vec![
        Box::new(TableFormatter),
        Box::new(JsonFormatter),
        Box::new(ShellFormatter),
        Box::new(ValueFormatter),
        Box::new(YamlFormatter),
    ]
}

/* -------------------------------------------------------------------------- */
/* Option readers                                                             */
/* -------------------------------------------------------------------------- */

pub(crate) fn flag(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

pub(crate) fn string_arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

pub(crate) fn strings_arg(args: &ArgMatches, id: &str) -> Vec<String> {
    args.try_get_many::<String>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

pub(crate) fn usize_arg(args: &ArgMatches, id: &str) -> Option<usize> {
    args.try_get_one::<usize>(id).ok().flatten().copied()
}

/// Pair column names with one row's values, in column order.
pub(crate) fn zip_row(columns: &[String], row: &[Cell]) -> serde_json::Map<String, serde_json::Value> {
    columns
        .iter()
        .zip(row)
        .map(|(c, v)| (c.clone(), v.machine_readable().clone()))
        .collect()
}
