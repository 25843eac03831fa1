/*!
Commands that print a list of rows.

Implement `Lister` and wrap it in `ListCommand` to get a `Command` with the
output options (`-f`, `-c`, the formatter groups) and row sorting:

  --sort-column COL     repeatable; earlier columns take priority, names
                        not in the result are ignored
  --sort-ascending      (default)
  --sort-descending

Sorting is stable. Null values sort after everything else when ascending
and before everything else when descending.
*/

use std::cmp::Ordering;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches};

use crate::app::App;
use crate::columns::{Cell, compare_cells};
use crate::command::{Command, base_parser};
use crate::display::{add_output_args, choose_formatter, column_selector, select, select_row};
use crate::formatters::{ListFormatter, flag, list_formatters, strings_arg};

/// Column names plus one `Vec<Cell>` per row.
pub type Rows = (Vec<String>, Vec<Vec<Cell>>);

pub trait Lister {
    fn description(&self) -> String {
        String::new()
    }

    /// Add command specific arguments.
    fn get_parser(&self, parser: clap::Command) -> clap::Command {
        parser
    }

    /// Produce the rows to print.
    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<Rows>;

    fn formatter_default(&self) -> &str {
        "table"
    }

    /// Listers that already return ordered rows can opt out of `--sort-column`.
    fn need_sort(&self) -> bool {
        true
    }
}

pub struct ListCommand<L> {
    lister: L,
    formatters: Vec<Box<dyn ListFormatter>>,
}

impl<L: Lister> ListCommand<L> {
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            formatters: list_formatters(),
        }
    }

    pub fn lister(&self) -> &L {
        &self.lister
    }
}

impl<L: Lister> Command for ListCommand<L> {
    fn description(&self) -> String {
        self.lister.description()
    }

    fn get_parser(&self, prog_name: &str) -> clap::Command {
        let parser = self
            .lister
            .get_parser(base_parser(prog_name, &self.lister.description()));
        let names: Vec<&'static str> = self.formatters.iter().map(|f| f.name()).collect();
        let mut parser = add_output_args(parser, &names, self.lister.formatter_default())
            .arg(
                Arg::new("sort_columns")
                    .long("sort-column")
                    .value_name("SORT_COLUMN")
                    .action(ArgAction::Append)
                    .help(
                        "specify the column(s) to sort the data (columns specified first have a \
                         priority, non-existing columns are ignored), can be repeated",
                    ),
            )
            .arg(
                Arg::new("sort_ascending")
                    .long("sort-ascending")
                    .action(ArgAction::SetTrue)
                    .help("sort the column(s) in ascending order"),
            )
            .arg(
                Arg::new("sort_descending")
                    .long("sort-descending")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("sort_ascending")
                    .help("sort the column(s) in descending order"),
            );
        for formatter in &self.formatters {
            parser = formatter.add_argument_group(parser);
        }
        parser
    }

    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32> {
        let (columns, mut rows) = self.lister.take_action(app, args)?;

        let sort_columns = strings_arg(args, "sort_columns");
        if self.lister.need_sort() && !sort_columns.is_empty() {
            sort_rows(&columns, &mut rows, &sort_columns, flag(args, "sort_descending"));
        }

        let selector = column_selector(&columns, args)?;
        let (columns, rows) = match selector.as_deref() {
            Some(s) => (
                select(&columns, s),
                rows.iter().map(|r| select_row(r, Some(s))).collect(),
            ),
            None => (columns, rows),
        };

        let formatter = choose_formatter(&self.formatters, args, self.lister.formatter_default())?;
        formatter.emit_list(&columns, &rows, app.stdout(), args)?;
        Ok(0)
    }
}

/* -------------------------------------------------------------------------- */
/* Sorting                                                                    */
/* -------------------------------------------------------------------------- */

/// Sort `rows` by the named columns, the first name being the primary key.
///
/// Applied as successive stable sorts from the last key to the first. A key
/// whose values can't be ordered against each other is skipped with a
/// warning.
pub fn sort_rows(columns: &[String], rows: &mut [Vec<Cell>], sort_columns: &[String], descending: bool) {
    let keys: Vec<(usize, &String)> = sort_columns
        .iter()
        .filter_map(|name| columns.iter().position(|c| c == name).map(|i| (i, name)))
        .collect();

    for (index, name) in keys.into_iter().rev() {
        if !sortable(rows, index) {
            tracing::warn!("Could not sort on field '{name}'; unsortable types");
            continue;
        }
        rows.sort_by(|a, b| {
            let ord = compare_key(a.get(index), b.get(index));
            if descending { ord.reverse() } else { ord }
        });
    }
}

fn sortable(rows: &[Vec<Cell>], index: usize) -> bool {
    let values: Vec<&Cell> = rows
        .iter()
        .filter_map(|r| r.get(index))
        .filter(|c| !c.is_null())
        .collect();
    values.windows(2).all(|w| compare_cells(w[0], w[1]).is_some())
}

fn compare_key(a: Option<&Cell>, b: Option<&Cell>) -> Ordering {
    let a = a.filter(|c| !c.is_null());
    let b = b.filter(|c| !c.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => compare_cells(x, y).unwrap_or(Ordering::Equal),
    }
}
