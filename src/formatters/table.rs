/*!
table.rs

Bordered ASCII table output, the default human-readable format.

```text
    +-------+---------------+
    | Field | Value         |
    +-------+---------------+
    | a     | A             |
    | d     | test carriage |
    |       | return        |
    +-------+---------------+
```

Layout rules:
  - one space of padding on each side of every cell
  - list tables right-align columns whose first-row value is a number,
    everything else (and every single-record table) is left-aligned
  - `\r\n` becomes a line break, a lone `\r` becomes a space
  - a column's width is the widest of its header and its cells, each cell
    counted at most up to the column's maximum width when one is set;
    cell lines longer than that maximum are word-wrapped

Width fitting:
  - `--max-width N` (N > 0) fits the table into N columns
  - otherwise `--fit-width` (or CLIKIT_FIT_WIDTH=1) fits it into the
    terminal width, when one is known
  - otherwise the table is printed at its natural width
  CLIKIT_MAX_TERM_WIDTH supplies a default for `--max-width`.

When a table is too wide, columns narrower than an even share of the
usable width keep their size and the remaining columns split what is
left, never going below a floor (8 for lists, 16 for single records).
*/

use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches};

use super::{Formatter, ListFormatter, SingleFormatter, flag, usize_arg};
use crate::columns::Cell;
use crate::utils::terminal_width;

pub const LIST_MIN_WIDTH: usize = 8;
pub const ONE_MIN_WIDTH: usize = 16;

/* -------------------------------------------------------------------------- */
/* Options                                                                    */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub max_width: usize,
    pub fit_width: bool,
    pub print_empty: bool,
}

impl TableOptions {
    pub fn from_args(args: &ArgMatches) -> Self {
        let max_width = usize_arg(args, "max_width")
            .filter(|w| *w > 0)
            .or_else(|| env_usize("CLIKIT_MAX_TERM_WIDTH"))
            .unwrap_or(0);
        let fit_width =
            flag(args, "fit_width") || env_usize("CLIKIT_FIT_WIDTH").is_some_and(|v| v > 0);
        Self {
            max_width,
            fit_width,
            print_empty: flag(args, "print_empty"),
        }
    }

    /// Width the table must fit in, if any.
    pub fn target_width(&self, terminal: Option<usize>) -> Option<usize> {
        if self.max_width > 0 {
            Some(self.max_width)
        } else if self.fit_width {
            terminal.filter(|w| *w > 0)
        } else {
            None
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/* -------------------------------------------------------------------------- */
/* Formatter                                                                  */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, Default)]
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn name(&self) -> &'static str {
        "table"
    }

    fn add_argument_group(&self, parser: clap::Command) -> clap::Command {
        parser
            .next_help_heading("table formatter")
            .arg(
                Arg::new("max_width")
                    .long("max-width")
                    .value_name("integer")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("0")
                    .help(
                        "Maximum display width, <1 to disable. You can also use the \
                         CLIKIT_MAX_TERM_WIDTH environment variable, but the parameter \
                         takes precedence.",
                    ),
            )
            .arg(
                Arg::new("fit_width")
                    .long("fit-width")
                    .action(ArgAction::SetTrue)
                    .help(
                        "Fit the table to the display width. Implied if --max-width is \
                         greater than 0. Set the environment variable CLIKIT_FIT_WIDTH=1 \
                         to always enable",
                    ),
            )
            .arg(
                Arg::new("print_empty")
                    .long("print-empty")
                    .action(ArgAction::SetTrue)
                    .help("Print empty table if there is no data to show."),
            )
    }
}

impl ListFormatter for TableFormatter {
    fn emit_list(
        &self,
        columns: &[String],
        data: &[Vec<Cell>],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()> {
        let rendered = render_list(columns, data, &TableOptions::from_args(args), terminal_width());
        if rendered.is_empty() {
            return Ok(());
        }
        writeln!(out, "{rendered}")?;
        Ok(())
    }
}

impl SingleFormatter for TableFormatter {
    fn emit_one(
        &self,
        columns: &[String],
        data: &[Cell],
        out: &mut dyn Write,
        args: &ArgMatches,
    ) -> Result<()> {
        let rendered = render_one(columns, data, &TableOptions::from_args(args), terminal_width());
        writeln!(out, "{rendered}")?;
        Ok(())
    }
}

/// Render rows; an empty result is an empty string unless `print_empty`.
pub fn render_list(
    columns: &[String],
    data: &[Vec<Cell>],
    opts: &TableOptions,
    terminal: Option<usize>,
) -> String {
    if data.is_empty() && !opts.print_empty {
        return String::new();
    }
    let mut table = Table::new(columns.to_vec());
    if let Some(first) = data.first() {
        for (i, cell) in first.iter().enumerate().take(columns.len()) {
            if cell.is_numeric() {
                table.align[i] = Align::Right;
            }
        }
    }
    for row in data {
        table.add_row(row.iter().map(cell_text).collect());
    }
    if let Some(width) = opts.target_width(terminal) {
        table.assign_max_widths(width, LIST_MIN_WIDTH);
    }
    table.render()
}

/// Render one record as a two-column Field/Value table.
pub fn render_one(
    columns: &[String],
    data: &[Cell],
    opts: &TableOptions,
    terminal: Option<usize>,
) -> String {
    let mut table = Table::new(vec!["Field".to_string(), "Value".to_string()]);
    for (name, cell) in columns.iter().zip(data) {
        table.add_row(vec![name.clone(), cell_text(cell)]);
    }
    if let Some(width) = opts.target_width(terminal) {
        table.assign_max_widths(width, ONE_MIN_WIDTH);
    }
    table.render()
}

fn cell_text(cell: &Cell) -> String {
    cell.human_readable().replace("\r\n", "\n").replace('\r', " ")
}

/* -------------------------------------------------------------------------- */
/* Table model                                                                */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    align: Vec<Align>,
    max_width: Vec<Option<usize>>,
}

impl Table {
    fn new(headers: Vec<String>) -> Self {
        let n = headers.len();
        Self {
            headers,
            rows: Vec::new(),
            align: vec![Align::Left; n],
            max_width: vec![None; n],
        }
    }

    fn add_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    fn column_widths(&self) -> Vec<usize> {
        (0..self.headers.len())
            .map(|c| {
                let limit = self.max_width[c].unwrap_or(usize::MAX);
                self.rows
                    .iter()
                    .map(|row| block_width(&row[c]).min(limit))
                    .fold(block_width(&self.headers[c]), usize::max)
            })
            .collect()
    }

    fn outer_width(&self) -> usize {
        let widths = self.column_widths();
        widths.iter().sum::<usize>() + 3 * widths.len() + 1
    }

    /// Cap column widths so the table fits `term_width` if it can.
    fn assign_max_widths(&mut self, term_width: usize, min_width: usize) {
        if self.outer_width() <= term_width {
            return;
        }
        let field_count = self.headers.len();
        let (usable, optimal) = width_info(term_width, field_count);
        let widths = self.column_widths();

        let mut shrink_fields = Vec::new();
        let mut remaining = usable;
        for (i, w) in widths.iter().enumerate() {
            if *w <= optimal {
                remaining = remaining.saturating_sub(*w);
            } else {
                shrink_fields.push(i);
            }
        }
        let Some((&last, rest)) = shrink_fields.split_last() else {
            return;
        };
        let shrink_to = remaining / shrink_fields.len();
        for &i in rest {
            self.max_width[i] = Some(min_width.max(shrink_to));
            remaining -= shrink_to;
        }
        self.max_width[last] = Some(min_width.max(remaining));
    }

    fn render(&self) -> String {
        let widths = self.column_widths();
        let rule = {
            let mut s = String::from("+");
            for w in &widths {
                s.push_str(&"-".repeat(w + 2));
                s.push('+');
            }
            s
        };

        let mut lines = vec![rule.clone()];
        let header_cells: Vec<Vec<String>> =
            self.headers.iter().map(|h| split_lines(h)).collect();
        lines.extend(self.render_row(&header_cells, &widths));
        lines.push(rule.clone());
        for row in &self.rows {
            let cells: Vec<Vec<String>> = row
                .iter()
                .enumerate()
                .map(|(c, text)| self.cell_lines(c, text))
                .collect();
            lines.extend(self.render_row(&cells, &widths));
        }
        lines.push(rule);
        lines.join("\n")
    }

    fn cell_lines(&self, column: usize, text: &str) -> Vec<String> {
        let Some(limit) = self.max_width[column] else {
            return split_lines(text);
        };
        text.split('\n')
            .flat_map(|line| {
                if display_width(line) > limit {
                    wrap_text(line, limit)
                } else {
                    vec![line.to_string()]
                }
            })
            .collect()
    }

    fn render_row(&self, cells: &[Vec<String>], widths: &[usize]) -> Vec<String> {
        let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        (0..height)
            .map(|line| {
                let mut s = String::from("|");
                for (c, cell) in cells.iter().enumerate() {
                    let text = cell.get(line).map(String::as_str).unwrap_or("");
                    s.push(' ');
                    s.push_str(&pad(text, widths[c], self.align[c]));
                    s.push_str(" |");
                }
                s
            })
            .collect()
    }
}

/// `(usable, optimal)`: width left for content once borders and padding of
/// `field_count` columns are taken out of `term_width`, and its even share.
pub fn width_info(term_width: usize, field_count: usize) -> (usize, usize) {
    let usable = term_width.saturating_sub(1 + 3 * field_count);
    let optimal = if field_count == 0 { 0 } else { usable / field_count };
    (usable, optimal)
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

fn block_width(text: &str) -> usize {
    text.split('\n').map(display_width).max().unwrap_or(0)
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(text)));
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

/// Greedy word wrap. Runs of whitespace separate words and are dropped at
/// line breaks; words longer than `max_width` are split to fill the line.
pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    // chunks are alternating runs of spaces and non-spaces, reversed so the
    // next chunk is at the end
    let mut chunks: Vec<String> = Vec::new();
    for ch in s.chars() {
        let ch = if ch.is_whitespace() { ' ' } else { ch };
        match chunks.last_mut() {
            Some(last) if last.starts_with(' ') == (ch == ' ') => last.push(ch),
            _ => chunks.push(ch.to_string()),
        }
    }
    chunks.reverse();

    let is_space = |c: &str| c.trim().is_empty();
    let mut lines: Vec<String> = Vec::new();
    while !chunks.is_empty() {
        let mut line: Vec<String> = Vec::new();
        let mut len = 0;
        if !lines.is_empty() && chunks.last().is_some_and(|c| is_space(c.as_str())) {
            chunks.pop();
        }
        while let Some(next) = chunks.last() {
            let l = display_width(next);
            if len + l > max_width {
                break;
            }
            len += l;
            line.extend(chunks.pop());
        }
        if let Some(next) = chunks.last_mut()
            && display_width(next) > max_width
        {
            let space_left = if max_width < 1 { 1 } else { max_width - len };
            let head: String = next.chars().take(space_left).collect();
            let tail: String = next.chars().skip(space_left).collect();
            line.push(head);
            *next = tail;
            if next.is_empty() {
                chunks.pop();
            }
        }
        if line.last().is_some_and(|c| is_space(c.as_str())) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.concat());
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    fn fitted() -> TableOptions {
        TableOptions {
            fit_width: true,
            ..TableOptions::default()
        }
    }

    fn one(columns: &[&str], data: &[&str], terminal: usize) -> String {
        format!("{}\n", render_one(&cols(columns), &row(data), &fitted(), Some(terminal)))
    }

    fn list(columns: &[&str], data: &[Vec<Cell>], opts: &TableOptions, terminal: usize) -> String {
        format!("{}\n", render_list(&cols(columns), data, opts, Some(terminal)))
    }

    #[test]
    fn single_record_with_carriage_returns() {
        let out = one(
            &["a", "b", "c", "d"],
            &["A", "B", "C", "test\rcarriage\r\nreturn"],
            80,
        );
        let expected = "\
+-------+---------------+
| Field | Value         |
+-------+---------------+
| a     | A             |
| b     | B             |
| c     | C             |
| d     | test carriage |
|       | return        |
+-------+---------------+
";
        assert_eq!(out, expected);
    }

    #[test]
    fn single_record_shrinks_to_width() {
        let c = ["field_name", "a_really_long_field_name"];
        let d = ["the value", "a value significantly longer than the field"];

        let expected_80 = "\
+--------------------------+---------------------------------------------+
| Field                    | Value                                       |
+--------------------------+---------------------------------------------+
| field_name               | the value                                   |
| a_really_long_field_name | a value significantly longer than the field |
+--------------------------+---------------------------------------------+
";
        assert_eq!(one(&c, &d, 80), expected_80);

        let expected_70 = "\
+--------------------------+-----------------------------------------+
| Field                    | Value                                   |
+--------------------------+-----------------------------------------+
| field_name               | the value                               |
| a_really_long_field_name | a value significantly longer than the   |
|                          | field                                   |
+--------------------------+-----------------------------------------+
";
        assert_eq!(one(&c, &d, 70), expected_70);

        let expected_50 = "\
+-----------------------+------------------------+
| Field                 | Value                  |
+-----------------------+------------------------+
| field_name            | the value              |
| a_really_long_field_n | a value significantly  |
| ame                   | longer than the field  |
+-----------------------+------------------------+
";
        assert_eq!(one(&c, &d, 50), expected_50);

        let expected_10 = "\
+------------------+------------------+
| Field            | Value            |
+------------------+------------------+
| field_name       | the value        |
| a_really_long_fi | a value          |
| eld_name         | significantly    |
|                  | longer than the  |
|                  | field            |
+------------------+------------------+
";
        assert_eq!(one(&c, &d, 10), expected_10);
    }

    #[test]
    fn list_with_carriage_returns() {
        let data = vec![row(&["A", "B", "C"]), row(&["D", "E", "test\rcarriage\r\nreturn"])];
        let expected = "\
+---+---+---------------+
| a | b | c             |
+---+---+---------------+
| A | B | C             |
| D | E | test carriage |
|   |   | return        |
+---+---+---------------+
";
        assert_eq!(list(&["a", "b", "c"], &data, &fitted(), 80), expected);
    }

    #[test]
    fn list_shrinks_columns_progressively() {
        let c = ["one", "two", "three"];
        let data = vec![row(&["one one one one one", "two two two two", "three three"])];

        let expected_80 = "\
+---------------------+-----------------+-------------+
| one                 | two             | three       |
+---------------------+-----------------+-------------+
| one one one one one | two two two two | three three |
+---------------------+-----------------+-------------+
";
        assert_eq!(list(&c, &data, &fitted(), 80), expected_80);

        let expected_50 = "\
+----------------+-----------------+-------------+
| one            | two             | three       |
+----------------+-----------------+-------------+
| one one one    | two two two two | three three |
| one one        |                 |             |
+----------------+-----------------+-------------+
";
        let out = list(&c, &data, &fitted(), 50);
        assert_eq!(out, expected_50);
        assert_eq!(out.lines().next().unwrap().len(), 50);

        let expected_45 = "\
+--------------+--------------+-------------+
| one          | two          | three       |
+--------------+--------------+-------------+
| one one one  | two two two  | three three |
| one one      | two          |             |
+--------------+--------------+-------------+
";
        let out = list(&c, &data, &fitted(), 45);
        assert_eq!(out, expected_45);
        assert_eq!(out.lines().next().unwrap().len(), 45);

        let expected_40 = "\
+------------+------------+------------+
| one        | two        | three      |
+------------+------------+------------+
| one one    | two two    | three      |
| one one    | two two    | three      |
| one        |            |            |
+------------+------------+------------+
";
        let out = list(&c, &data, &fitted(), 40);
        assert_eq!(out, expected_40);
        assert_eq!(out.lines().next().unwrap().len(), 40);

        let expected_10 = "\
+----------+----------+----------+
| one      | two      | three    |
+----------+----------+----------+
| one one  | two two  | three    |
| one one  | two two  | three    |
| one      |          |          |
+----------+----------+----------+
";
        let out = list(&c, &data, &fitted(), 10);
        assert_eq!(out, expected_10);
        assert_eq!(out.lines().next().unwrap().len(), 11 * 3 + 1);
    }

    #[test]
    fn numbers_are_right_aligned() {
        let data = vec![
            vec![Cell::from("alpha"), Cell::from(1i64)],
            vec![Cell::from("b"), Cell::from(100i64)],
        ];
        let expected = "\
+-------+------+
| name  | size |
+-------+------+
| alpha |    1 |
| b     |  100 |
+-------+------+
";
        assert_eq!(list(&["name", "size"], &data, &TableOptions::default(), 80), expected);
    }

    #[test]
    fn empty_list() {
        let c = ["a", "b", "c"];
        assert_eq!(list(&c, &[], &TableOptions::default(), 80), "\n");
        let opts = TableOptions {
            print_empty: true,
            ..TableOptions::default()
        };
        let expected = "\
+---+---+---+
| a | b | c |
+---+---+---+
+---+---+---+
";
        assert_eq!(list(&c, &[], &opts, 80), expected);
    }

    #[test]
    fn target_width_selection() {
        let natural = TableOptions::default();
        assert_eq!(natural.target_width(Some(80)), None);
        let fitted = TableOptions {
            fit_width: true,
            ..TableOptions::default()
        };
        assert_eq!(fitted.target_width(Some(80)), Some(80));
        assert_eq!(fitted.target_width(None), None);
        let fixed = TableOptions {
            max_width: 42,
            ..TableOptions::default()
        };
        assert_eq!(fixed.target_width(None), Some(42));
        assert_eq!(fixed.target_width(Some(120)), Some(42));
    }

    #[test]
    fn options_come_from_parsed_args() {
        let parser = TableFormatter.add_argument_group(clap::Command::new("t").no_binary_name(true));
        let m = parser
            .try_get_matches_from(["--max-width", "50", "--print-empty"])
            .unwrap();
        let opts = TableOptions::from_args(&m);
        assert_eq!(opts.max_width, 50);
        assert!(opts.print_empty);
    }

    #[test]
    fn width_info_values() {
        assert_eq!(width_info(80, 10), (49, 4));
        assert_eq!(width_info(80, 1), (76, 76));
        assert_eq!(width_info(80, 0), (79, 0));
        assert_eq!(width_info(0, 80), (0, 0));
    }

    #[test]
    fn wrap_breaks_words_and_long_tokens() {
        assert_eq!(wrap_text("hello world from formatting", 10), vec!["hello", "world from", "formatting"]);
        assert_eq!(wrap_text("a_really_long_field_name", 21), vec!["a_really_long_field_n", "ame"]);
        assert_eq!(wrap_text("ab abcdefgh", 5), vec!["ab ab", "cdefg", "h"]);
    }

    #[test]
    fn ansi_sequences_do_not_count_towards_width() {
        assert_eq!(strip_ansi("\x1b[31mRED\x1b[0m"), "RED");
        assert_eq!(display_width("\x1b[1mbold\x1b[0m"), 4);
    }
}
