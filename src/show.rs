//! Commands that print a single record as field/value pairs.

use anyhow::Result;
use clap::ArgMatches;

use crate::app::App;
use crate::columns::Cell;
use crate::command::{Command, base_parser};
use crate::display::{add_output_args, choose_formatter, column_selector, select, select_row};
use crate::formatters::{SingleFormatter, single_formatters};

/// Field names and the matching values.
pub type Record = (Vec<String>, Vec<Cell>);

pub trait ShowOne {
    fn description(&self) -> String {
        String::new()
    }

    fn get_parser(&self, parser: clap::Command) -> clap::Command {
        parser
    }

    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<Record>;

    fn formatter_default(&self) -> &str {
        "table"
    }
}

pub struct ShowCommand<S> {
    show: S,
    formatters: Vec<Box<dyn SingleFormatter>>,
}

impl<S: ShowOne> ShowCommand<S> {
    pub fn new(show: S) -> Self {
        Self {
            show,
            formatters: single_formatters(),
        }
    }
}

impl<S: ShowOne> Command for ShowCommand<S> {
    fn description(&self) -> String {
        self.show.description()
    }

    fn get_parser(&self, prog_name: &str) -> clap::Command {
        let parser = self
            .show
            .get_parser(base_parser(prog_name, &self.show.description()));
        let names: Vec<&'static str> = self.formatters.iter().map(|f| f.name()).collect();
        let mut parser = add_output_args(parser, &names, self.show.formatter_default());
        for formatter in &self.formatters {
            parser = formatter.add_argument_group(parser);
        }
        parser
    }

    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32> {
        let (columns, data) = self.show.take_action(app, args)?;
        let (columns, data) = match column_selector(&columns, args)? {
            Some(s) => (select(&columns, &s), select_row(&data, Some(&s))),
            None => (columns, data),
        };
        let formatter = choose_formatter(&self.formatters, args, self.show.formatter_default())?;
        formatter.emit_one(&columns, &data, app.stdout(), args)?;
        Ok(0)
    }
}
