//! JSON output: a list of objects, or a single object, keyed by column
//! name in column order. Indented by default, `--noindent` for one line.

use std::io::Write;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches};
use serde_json::Value;

use super::{Formatter, ListFormatter, SingleFormatter, flag, zip_row};
use crate::columns::Cell;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    fn write(&self, value: &Value, out: &mut dyn Write, args: &ArgMatches) -> Result<()> {
        let text = if flag(args, "noindent") {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        writeln!(out, "{text}")?;
        Ok(())
    }
}

impl Formatter for JsonFormatter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn add_argument_group(&self, parser: clap::Command) -> clap::Command {
        parser.next_help_heading("json formatter").arg(
            Arg::new("noindent")
                .long("noindent")
                .action(ArgAction::SetTrue)
                .help("whether to disable indenting the JSON"),
        )
    }
}

impl ListFormatter for JsonFormatter {
    fn emit_list(
        &self,
        columns: &[String],
        data: &[Vec<Cell>],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()> {
        let items: Vec<Value> = data
            .iter()
            .map(|row| Value::Object(zip_row(columns, row)))
            .collect();
        self.write(&Value::Array(items), out, args)
    }
}

impl SingleFormatter for JsonFormatter {
    fn emit_one(
        &self,
        columns: &[String],
        data: &[Cell],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()> {
        self.write(&Value::Object(zip_row(columns, data)), out, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(noindent: bool) -> ArgMatches {
        let parser = JsonFormatter.add_argument_group(clap::Command::new("t").no_binary_name(true));
        let argv: Vec<&str> = if noindent { vec!["--noindent"] } else { vec![] };
        parser.try_get_matches_from(argv).unwrap()
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_object_indented_or_not() {
        let c = strings(&["a", "b", "c", "d"]);
        let d: Vec<Cell> = ["A", "B", "C", "\"escape me\""].into_iter().map(Cell::from).collect();
        let expected = json!({"a": "A", "b": "B", "c": "C", "d": "\"escape me\""});

        let mut out = Vec::new();
        JsonFormatter.emit_one(&c, &d, &mut out, &args(true)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), expected);

        let mut out = Vec::new();
        JsonFormatter.emit_one(&c, &d, &mut out, &args(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), expected);
    }

    #[test]
    fn list_keeps_column_order() {
        let c = strings(&["b", "a", "c"]);
        let rows: Vec<Vec<Cell>> = (0..3)
            .map(|i| vec![Cell::from(i as i64), Cell::from("x"), Cell::null()])
            .collect();

        let mut out = Vec::new();
        JsonFormatter.emit_list(&c, &rows, &mut out, &args(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 17);
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());

        let mut out = Vec::new();
        JsonFormatter.emit_list(&c, &rows, &mut out, &args(true)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(r#"[{"b":0,"a":"x","c":null}"#));
    }

    #[test]
    fn empty_list_is_an_empty_array() {
        let mut out = Vec::new();
        JsonFormatter
            .emit_list(&strings(&["a"]), &[], &mut out, &ArgMatches::default())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }
}
