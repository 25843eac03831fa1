/*!
Contracts between the application and the commands it dispatches to.

  - `Command`      : parser construction + the action itself
  - `Loader`       : lazily produces a `CommandFactory` for one registry entry
  - `CommandHook`  : before/after callbacks attached to a named command

A loader is the only thing the resolution core stores per command. It is
not invoked while resolving; the application loads it once a name has been
matched, then calls the factory with the name the user typed.
*/

use std::sync::Arc;

use anyhow::Result;
use clap::ArgMatches;

use crate::app::App;

/// A runnable subcommand.
pub trait Command {
    /// Long description; the first line is used as the one-liner in
    /// command listings.
    fn description(&self) -> String {
        String::new()
    }

    /// Deprecated commands still run but are left out of help listings.
    fn deprecated(&self) -> bool {
        false
    }

    /// Build the argument parser. `prog_name` is the name shown in usage
    /// lines (`"app cmd"`, or just `"cmd"` inside the interactive shell).
    fn get_parser(&self, prog_name: &str) -> clap::Command {
        base_parser(prog_name, &self.description())
    }

    /// Run the command, returning the process exit code.
    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32>;
}

/// Parser every command starts from.
pub fn base_parser(prog_name: &str, description: &str) -> clap::Command {
    let mut parser = clap::Command::new(prog_name.to_string()).no_binary_name(true);
    if !description.is_empty() {
        parser = parser.about(description.to_string());
    }
    parser
}

/// First line of a description without its trailing period.
pub fn one_liner(description: &str) -> &str {
    description
        .lines()
        .next()
        .unwrap_or("")
        .trim_end()
        .trim_end_matches('.')
}

/// Builds a command instance; receives the command name as typed.
pub type CommandFactory = Arc<dyn Fn(&str) -> Box<dyn Command> + Send + Sync>;

/// Produces the factory for one registry entry.
pub trait Loader: Send + Sync {
    fn load(&self) -> Result<CommandFactory>;

    /// Where the command comes from, for diagnostics.
    fn origin(&self) -> String;
}

/// In-process loader wrapping a ready factory.
pub struct FactoryLoader {
    origin: String,
    factory: CommandFactory,
}

impl FactoryLoader {
    pub fn new(origin: impl Into<String>, factory: CommandFactory) -> Self {
        Self {
            origin: origin.into(),
            factory,
        }
    }
}

impl Loader for FactoryLoader {
    fn load(&self) -> Result<CommandFactory> {
        Ok(self.factory.clone())
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }
}

impl std::fmt::Debug for FactoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryLoader")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Shorthand for registering a closure as a loader.
pub fn loader<F>(origin: impl Into<String>, factory: F) -> Arc<dyn Loader>
where
    F: Fn(&str) -> Box<dyn Command> + Send + Sync + 'static,
{
    Arc::new(FactoryLoader::new(origin, Arc::new(factory)))
}

/* -------------------------------------------------------------------------- */
/* Hooks                                                                      */
/* -------------------------------------------------------------------------- */

/// Extension point attached to a command by name.
///
/// A fresh hook instance is created for every run of the command, so hooks
/// may keep per-run state between `before` and `after`.
pub trait CommandHook {
    /// Add arguments to the command's parser.
    fn get_parser(&self, parser: clap::Command) -> clap::Command {
        parser
    }

    /// Text appended to the command's help epilog.
    fn get_epilog(&self) -> Option<String> {
        None
    }

    fn before(&mut self, _app: &mut App, _args: &ArgMatches) -> Result<()> {
        Ok(())
    }

    /// Sees the command's return code and may replace it.
    fn after(&mut self, _app: &mut App, _args: &ArgMatches, return_code: i32) -> i32 {
        return_code
    }
}

pub type HookFactory = Arc<dyn Fn() -> Box<dyn CommandHook> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    impl Command for Quiet {
        fn description(&self) -> String {
            "Stay quiet.\n\nLonger text follows here.".into()
        }

        fn take_action(&mut self, _app: &mut App, _args: &ArgMatches) -> Result<i32> {
            Ok(0)
        }
    }

    #[test]
    fn one_liner_strips_period_and_rest() {
        assert_eq!(one_liner(&Quiet.description()), "Stay quiet");
        assert_eq!(one_liner(""), "");
        assert_eq!(one_liner("no period"), "no period");
    }

    #[test]
    fn default_parser_uses_prog_name_and_about() {
        let mut parser = Quiet.get_parser("demo quiet");
        assert_eq!(parser.get_name(), "demo quiet");
        let help = parser.render_help().to_string();
        assert!(help.contains("Stay quiet."));
        parser.clone().try_get_matches_from(Vec::<String>::new()).unwrap();
    }

    #[test]
    fn factory_loader_hands_out_the_same_factory() {
        let l = loader("tests::quiet", |_| Box::new(Quiet));
        assert_eq!(l.origin(), "tests::quiet");
        let factory = l.load().unwrap();
        let cmd = factory("quiet");
        assert!(!cmd.deprecated());
    }
}
