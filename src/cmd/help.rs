/*!
help.rs - the `help` command and the application help screen.

  app help              -> same as `app --help`
  app help list files   -> full help of `list files`
  app help li           -> `Command "li" matches:` + candidates, when `li`
                           doesn't resolve on its own
*/

use anyhow::Result;
use clap::{Arg, ArgMatches};

use crate::app::App;
use crate::command::{Command, base_parser, one_liner};
use crate::commandmanager::CommandEntry;
use crate::errors::ResolutionError;
use crate::formatters::strings_arg;

/* ---- App help ---- */

/// Global options followed by one line per visible command.
pub fn print_app_help(app: &mut App) -> Result<()> {
    let usage = app.option_parser().render_help().to_string();
    writeln!(app.stdout(), "{}", usage.trim_end())?;
    writeln!(app.stdout(), "\nCommands:")?;

    let mut entries: Vec<(String, CommandEntry)> = app
        .command_manager()
        .iter()
        .map(|(name, entry)| (name.to_string(), entry.clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, entry) in entries {
        let factory = match entry.load() {
            Ok(factory) => factory,
            Err(err) => {
                tracing::debug!("{name}: {err:#}");
                writeln!(app.stdout(), "Could not load {}", entry.origin())?;
                continue;
            }
        };
        let cmd = factory(&name);
        if cmd.deprecated() {
            continue;
        }
        let description = cmd.description();
        writeln!(app.stdout(), "  {:<13}  {}", name, one_liner(&description))?;
    }
    Ok(())
}

/* ---- help command ---- */

#[derive(Debug, Default)]
pub struct HelpCommand;

impl Command for HelpCommand {
    fn description(&self) -> String {
        "Print detailed help for another command.".into()
    }

    fn get_parser(&self, prog_name: &str) -> clap::Command {
        base_parser(prog_name, &self.description()).arg(
            Arg::new("cmd")
                .num_args(0..)
                .value_name("CMD")
                .help("name of the command"),
        )
    }

    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32> {
        let words = strings_arg(args, "cmd");
        if words.is_empty() {
            print_app_help(app)?;
            return Ok(0);
        }

        let found = match app.command_manager().find_command(&words) {
            Ok(found) => found,
            Err(err) => {
                let typed = &words[0];
                let mut candidates: Vec<String> = app
                    .command_manager()
                    .names()
                    .filter(|name| name.starts_with(typed.as_str()))
                    .map(str::to_string)
                    .collect();
                if candidates.is_empty() {
                    return Err(err.into());
                }
                candidates.sort();
                writeln!(app.stdout(), "Command \"{typed}\" matches:")?;
                for candidate in candidates {
                    writeln!(app.stdout(), "  {candidate}")?;
                }
                return Ok(0);
            }
        };

        let factory = found
            .entry
            .load()
            .map_err(|source| ResolutionError::LoaderFailure {
                name: found.canonical.clone(),
                source,
            })?;
        let cmd = factory(&found.name);
        let help = app
            .command_parser(cmd.as_ref(), &found.canonical, &found.name)
            .render_help()
            .to_string();
        writeln!(app.stdout(), "{}", help.trim_end())?;
        Ok(0)
    }
}
