/*!
Interactive shell, entered when no command is given on the command line.

Each input line is split with shell quoting rules and dispatched through
`App::run_subcommand`, so abbreviations, aliases and hooks behave as they
do on the command line. Built-ins:

  help / ?        list shell and application commands
  help <topic>    help for an application command
  quit / exit     leave (so does end of input)
*/

use std::io::Write;

use anyhow::Result;

use crate::app::App;

const SHELL_COMMANDS: [&str; 3] = ["exit", "help", "quit"];
const DISPLAY_WIDTH: usize = 79;

enum Flow {
    Continue,
    Stop,
}

pub struct InteractiveShell {
    prompt: String,
}

impl InteractiveShell {
    pub fn new(app_name: &str) -> Self {
        Self {
            prompt: format!("({app_name}) "),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Read and run lines until `quit`, `exit` or end of input.
    ///
    /// Errors a command returns (only with `--debug`) end the loop.
    pub fn cmdloop(&self, app: &mut App) -> Result<()> {
        loop {
            write!(app.stdout(), "{}", self.prompt)?;
            app.stdout().flush()?;

            let mut line = String::new();
            if app.stdin().read_line(&mut line)? == 0 {
                writeln!(app.stdout())?;
                return Ok(());
            }
            if let Flow::Stop = self.onecmd(app, &line)? {
                return Ok(());
            }
        }
    }

    fn onecmd(&self, app: &mut App, line: &str) -> Result<Flow> {
        let words = match shell_words::split(line.trim()) {
            Ok(words) => words,
            Err(err) => {
                tracing::error!("Invalid input '{}': {err}", line.trim());
                return Ok(Flow::Continue);
            }
        };
        let Some(first) = words.first() else {
            return Ok(Flow::Continue);
        };

        match first.as_str() {
            "quit" | "exit" => return Ok(Flow::Stop),
            "help" | "?" if words.len() == 1 => self.print_topics(app)?,
            "help" | "?" => {
                let topic = &words[1..];
                if topic.len() == 1 && SHELL_COMMANDS.contains(&topic[0].as_str()) && topic[0] != "help" {
                    writeln!(app.stdout(), "Leave the interactive shell.")?;
                } else {
                    let mut argv = vec!["help".to_string()];
                    argv.extend(topic.iter().cloned());
                    app.run_subcommand(&argv)?;
                }
            }
            _ => {
                let code = app.run_subcommand(&words)?;
                tracing::debug!("{} returned {code}", words.join(" "));
            }
        }
        Ok(Flow::Continue)
    }

    fn print_topics(&self, app: &mut App) -> Result<()> {
        let mut names: Vec<String> = app
            .command_manager()
            .names()
            .filter(|name| *name != "help")
            .map(str::to_string)
            .collect();
        names.sort();
        let shell: Vec<String> = SHELL_COMMANDS.iter().map(|s| s.to_string()).collect();

        let out = app.stdout();
        writeln!(out)?;
        print_topic(out, "Shell commands (type help <topic>):", &shell)?;
        print_topic(out, "Application commands (type help <topic>):", &names)?;
        Ok(())
    }
}

fn print_topic(out: &mut dyn Write, header: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "=".repeat(header.chars().count()))?;
    for line in columnize(names, DISPLAY_WIDTH) {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Lay `items` out in as few rows as fit `width`, filling columns top to
/// bottom, two spaces between columns.
pub fn columnize(items: &[String], width: usize) -> Vec<String> {
    let size = items.len();
    if size <= 1 {
        return items.to_vec();
    }

    let mut layout = (size, 1, vec![0]);
    for rows in 1..size {
        let cols = size.div_ceil(rows);
        let mut widths = Vec::with_capacity(cols);
        let mut total: isize = -2;
        for col in 0..cols {
            let w = (0..rows)
                .filter_map(|row| items.get(row + rows * col))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0);
            widths.push(w);
            total += w as isize + 2;
            if total > width as isize {
                break;
            }
        }
        if total <= width as isize {
            layout = (rows, cols, widths);
            break;
        }
    }

    let (rows, cols, widths) = layout;
    (0..rows)
        .map(|row| {
            let texts: Vec<&str> = (0..cols)
                .map_while(|col| items.get(row + rows * col).map(String::as_str))
                .collect();
            let last = texts.len().saturating_sub(1);
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    if i == last {
                        t.to_string()
                    } else {
                        format!("{t:<width$}", width = widths[i])
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, loader};
    use crate::testing::{SharedBuffer, app_with};
    use clap::ArgMatches;

    struct Hello;

    impl Command for Hello {
        fn description(&self) -> String {
            "Say hello.".into()
        }

        fn get_parser(&self, prog_name: &str) -> clap::Command {
            crate::command::base_parser(prog_name, &self.description())
                .arg(clap::Arg::new("who").default_value("world"))
        }

        fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32> {
            let who = args.get_one::<String>("who").cloned().unwrap_or_default();
            writeln!(app.stdout(), "hello {who}")?;
            Ok(0)
        }
    }

    fn shell_app(input: &str) -> (App, SharedBuffer) {
        let out = SharedBuffer::default();
        let mut app = app_with(out.clone(), input);
        app.command_manager_mut()
            .add_command("say hello", loader("test::hello", |_| Box::new(Hello)));
        (app, out)
    }

    #[test]
    fn runs_lines_until_quit() {
        let (mut app, out) = shell_app("say hello\n\nsay hello 'big world'\nquit\nsay hello\n");
        assert_eq!(app.run(&Vec::<String>::new()).unwrap(), 0);
        assert!(app.interactive_mode());
        assert_eq!(
            out.contents(),
            "(test) hello world\n(test) (test) hello big world\n(test) "
        );
    }

    #[test]
    fn end_of_input_leaves() {
        let (mut app, out) = shell_app("say hello\n");
        InteractiveShell::new("test").cmdloop(&mut app).unwrap();
        assert_eq!(out.contents(), "(test) hello world\n(test) \n");
    }

    #[test]
    fn bad_quoting_is_skipped() {
        let (mut app, out) = shell_app("say hello 'oops\nsay hello\nexit\n");
        InteractiveShell::new("test").cmdloop(&mut app).unwrap();
        assert_eq!(out.contents(), "(test) (test) hello world\n(test) ");
    }

    #[test]
    fn help_lists_both_kinds_of_commands() {
        let (mut app, out) = shell_app("help\nquit\n");
        InteractiveShell::new("test").cmdloop(&mut app).unwrap();
        assert_eq!(
            out.contents(),
            "(test) \n\
             Shell commands (type help <topic>):\n\
             ===================================\n\
             exit  help  quit\n\
             \n\
             Application commands (type help <topic>):\n\
             =========================================\n\
             complete  say hello\n\
             \n\
             (test) "
        );
    }

    #[test]
    fn help_topic_goes_to_help_command() {
        let (mut app, out) = shell_app("? say hello\nquit\n");
        InteractiveShell::new("test").cmdloop(&mut app).unwrap();
        let text = out.contents();
        assert!(text.contains("Say hello."));
        assert!(text.contains("Usage: test say hello"));
    }

    #[test]
    fn columnize_fills_columns_first() {
        let items: Vec<String> = ["a", "bb", "ccc", "dddd", "e"].iter().map(|s| s.to_string()).collect();
        assert_eq!(columnize(&items, 80), vec!["a  bb  ccc  dddd  e"]);
        assert_eq!(columnize(&items, 10), vec!["a    dddd", "bb   e", "ccc"]);
        assert_eq!(columnize(&items[..1], 10), vec!["a"]);
    }
}
