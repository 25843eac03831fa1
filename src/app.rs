/*!
The application: global options, command dispatch and the interactive loop.

Flow of `App::run(argv)`:

  1. Parse the global options. Parsing stops at the first positional word;
     that word and everything after it is the remainder handed to the
     command, untouched.
  2. Configure logging from `-v`/`-q`/`--log-file`.
  3. Handle `-h` (immediately, or folded into `help <remainder>` when help
     is deferred).
  4. `AppLifecycle::initialize_app`.
  5. Empty remainder: interactive shell. Otherwise `run_subcommand`.

Exit codes:
  0  success / help / version
  1  command or initialization failure
  2  usage error, unknown command, command that could not be loaded

With `--debug` failures are returned as `Err` instead of being turned into
exit codes, after the normal cleanup has run.
*/

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Args, CommandFactory, FromArgMatches, Parser};

use crate::cmd::{CompleteCommand, HelpCommand, print_app_help};
use crate::command::{Command, CommandHook, HookFactory, loader};
use crate::commandmanager::{CommandManager, FoundCommand};
use crate::errors::ResolutionError;
use crate::fuzzy::fuzzy_matches;
use crate::interactive::InteractiveShell;
use crate::utils::{derive_level, init_logging};

/* ---- Global options ---- */

/// Options accepted before the command name.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Increase verbosity of output. Can be repeated.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Suppress output except warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Specify a file to log output. Disabled by default.
    #[arg(long, value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Show help message and exit.
    #[arg(short, long)]
    pub help: bool,

    /// Return errors to the caller instead of logging them.
    #[arg(long)]
    pub debug: bool,
}

impl GlobalOptions {
    /// 0 when quiet, otherwise 1 plus the number of `-v`.
    pub fn verbose_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true, no_binary_name = true)]
struct GlobalCli {
    #[command(flatten)]
    options: GlobalOptions,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    remainder: Vec<String>,
}

/* ---- Lifecycle ---- */

/// Application-level callbacks around every run. All default to no-ops.
pub trait AppLifecycle {
    /// Called once, after global options are parsed, with the remainder.
    fn initialize_app(&mut self, _argv: &[String]) -> Result<()> {
        Ok(())
    }

    /// Called before a command's arguments are parsed.
    fn prepare_to_run_command(&mut self, _cmd_name: &str) -> Result<()> {
        Ok(())
    }

    /// Called after every command, successful or not.
    fn clean_up(&mut self, _cmd_name: &str, _result: i32, _err: Option<&anyhow::Error>) -> Result<()> {
        Ok(())
    }
}

struct NoLifecycle;

impl AppLifecycle for NoLifecycle {}

/* ---- App ---- */

pub struct App {
    name: String,
    description: String,
    version: String,
    command_manager: CommandManager,
    stdin: Box<dyn BufRead>,
    stdout: Box<dyn Write>,
    options: GlobalOptions,
    interactive_mode: bool,
    deferred_help: bool,
    lifecycle: Box<dyn AppLifecycle>,
    hooks: HashMap<String, Vec<HookFactory>>,
}

impl App {
    /// Create an app around `command_manager`, adding the built-in `help`
    /// and `complete` commands.
    pub fn new(description: &str, version: &str, mut command_manager: CommandManager) -> Self {
        command_manager.add_command("help", loader("clikit::cmd::help", |_| Box::new(HelpCommand)));
        command_manager.add_command(
            "complete",
            loader("clikit::cmd::complete", |_| Box::new(CompleteCommand)),
        );
        Self {
            name: program_name(),
            description: description.to_string(),
            version: version.to_string(),
            command_manager,
            stdin: Box::new(std::io::BufReader::new(std::io::stdin())),
            stdout: Box::new(std::io::stdout()),
            options: GlobalOptions::default(),
            interactive_mode: false,
            deferred_help: false,
            lifecycle: Box::new(NoLifecycle),
            hooks: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_streams(mut self, stdin: Box<dyn BufRead>, stdout: Box<dyn Write>) -> Self {
        self.stdin = stdin;
        self.stdout = stdout;
        self
    }

    /// Let `-h` be handled after `initialize_app`, as `help <command>` when
    /// a command was given.
    pub fn with_deferred_help(mut self, deferred: bool) -> Self {
        self.deferred_help = deferred;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Box<dyn AppLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Attach a hook to the command registered under `command`.
    pub fn register_hook<F>(&mut self, command: &str, factory: F)
    where
        F: Fn() -> Box<dyn CommandHook> + Send + Sync + 'static,
    {
        self.hooks
            .entry(command.to_string())
            .or_default()
            .push(Arc::new(factory));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn command_manager(&self) -> &CommandManager {
        &self.command_manager
    }

    pub fn command_manager_mut(&mut self) -> &mut CommandManager {
        &mut self.command_manager
    }

    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    pub fn interactive_mode(&self) -> bool {
        self.interactive_mode
    }

    pub fn stdout(&mut self) -> &mut dyn Write {
        self.stdout.as_mut()
    }

    pub fn stdin(&mut self) -> &mut dyn BufRead {
        self.stdin.as_mut()
    }

    /// Parser for the global options, as shown by `--help`.
    pub fn option_parser(&self) -> clap::Command {
        GlobalCli::command()
            .name(self.name.clone())
            .about(self.description.clone())
            .version(self.version.clone())
            .override_usage(format!("{} [OPTIONS] <COMMAND> [ARGS]...", self.name))
            .arg(
                Arg::new("version")
                    .long("version")
                    .action(ArgAction::Version)
                    .help("Show program's version number and exit."),
            )
    }

    /* ---- Running ---- */

    pub fn run<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<i32> {
        let argv: Vec<String> = argv.iter().map(|a| a.as_ref().to_string()).collect();
        let matches = match self.option_parser().try_get_matches_from(&argv) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::DisplayVersion => {
                write!(self.stdout, "{}", e.render())?;
                return Ok(0);
            }
            Err(e) => {
                eprint!("{}", e.render());
                return Ok(2);
            }
        };
        let cli = GlobalCli::from_arg_matches(&matches)?;
        self.options = cli.options;
        let mut remainder = cli.remainder;

        match self.start(&mut remainder) {
            Ok(true) => return Ok(0),
            Ok(false) => {}
            Err(err) => {
                if self.options.debug {
                    tracing::error!("{err:?}");
                    return Err(err);
                }
                tracing::error!("{err:#}");
                return Ok(1);
            }
        }

        if self.interactive_mode {
            self.interact()
        } else {
            self.run_subcommand(&remainder)
        }
    }

    /// Logging, help handling and `initialize_app`. `Ok(true)` when help
    /// was printed and the run is over.
    fn start(&mut self, remainder: &mut Vec<String>) -> Result<bool> {
        if self.options.help && !self.deferred_help {
            print_app_help(self)?;
            return Ok(true);
        }
        init_logging(
            derive_level(self.options.verbose_level()),
            self.options.log_file.as_deref(),
        )?;
        self.interactive_mode = remainder.is_empty();

        if self.deferred_help && self.options.help && !remainder.is_empty() {
            self.options.help = false;
            remainder.insert(0, "help".to_string());
        }
        self.lifecycle.initialize_app(remainder)?;
        if self.deferred_help && self.options.help {
            print_app_help(self)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn interact(&mut self) -> Result<i32> {
        let shell = InteractiveShell::new(&self.name);
        shell.cmdloop(self)?;
        Ok(0)
    }

    /// Resolve `argv` to a command and run it.
    pub fn run_subcommand<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<i32> {
        let found = match self.command_manager.find_command(argv) {
            Ok(found) => found,
            Err(err) => return self.report_unknown(argv, err),
        };
        let factory = match found.entry.load() {
            Ok(factory) => factory,
            Err(source) => {
                let err = anyhow::Error::from(ResolutionError::LoaderFailure {
                    name: found.canonical.clone(),
                    source,
                });
                if self.options.debug {
                    return Err(err);
                }
                tracing::error!("{err:#}");
                return Ok(2);
            }
        };
        let mut cmd = factory(&found.name);
        let mut hooks = self.instantiate_hooks(&found.canonical);

        match self.execute(cmd.as_mut(), &mut hooks, &found) {
            Ok(code) => {
                self.clean_up(&found.name, code, None);
                Ok(code)
            }
            Err(err) => {
                if self.options.debug {
                    tracing::error!("{err:?}");
                } else {
                    tracing::error!("{err:#}");
                }
                self.clean_up(&found.name, 1, Some(&err));
                if self.options.debug {
                    return Err(err);
                }
                Ok(1)
            }
        }
    }

    fn execute(
        &mut self,
        cmd: &mut dyn Command,
        hooks: &mut [Box<dyn CommandHook>],
        found: &FoundCommand,
    ) -> Result<i32> {
        self.lifecycle.prepare_to_run_command(&found.name)?;

        let mut parser = self.build_parser(&*cmd, hooks, &found.name);
        let args: ArgMatches = match parser.try_get_matches_from_mut(&found.remaining) {
            Ok(m) => m,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                write!(self.stdout, "{}", e.render())?;
                return Ok(0);
            }
            Err(e) => {
                tracing::error!("{}", e.render().to_string().trim_end());
                return Ok(2);
            }
        };

        for hook in hooks.iter_mut() {
            hook.before(self, &args)?;
        }
        let mut code = cmd.take_action(self, &args)?;
        for hook in hooks.iter_mut() {
            code = hook.after(self, &args, code);
        }
        Ok(code)
    }

    fn clean_up(&mut self, cmd_name: &str, result: i32, err: Option<&anyhow::Error>) {
        if let Err(e) = self.lifecycle.clean_up(cmd_name, result, err) {
            if self.options.debug {
                tracing::error!("{e:?}");
            } else {
                tracing::error!("Could not clean up: {e:#}");
            }
        }
    }

    fn report_unknown<S: AsRef<str>>(&mut self, argv: &[S], err: ResolutionError) -> Result<i32> {
        let candidates = match argv.first() {
            Some(first) => self.get_fuzzy_matches(first.as_ref()),
            None => Vec::new(),
        };
        if let Some(first) = argv.first()
            && !candidates.is_empty()
        {
            let name = &self.name;
            let article = if name.starts_with(['a', 'e', 'i', 'o', 'u']) { "an" } else { "a" };
            writeln!(
                self.stdout,
                "{name}: '{}' is not {article} {name} command. See '{name} --help'.",
                first.as_ref()
            )?;
            writeln!(self.stdout, "Did you mean one of these?")?;
            for candidate in &candidates {
                writeln!(self.stdout, "  {candidate}")?;
            }
        } else if self.options.debug {
            return Err(err.into());
        } else {
            tracing::error!("{err}");
        }
        Ok(2)
    }

    /// Registered names close to `cmd`, best matches only.
    pub fn get_fuzzy_matches(&self, cmd: &str) -> Vec<String> {
        let separator = if self.command_manager.convert_underscores() { ' ' } else { '_' };
        fuzzy_matches(cmd, self.command_manager.names(), separator)
    }

    /* ---- Parsers and hooks ---- */

    fn instantiate_hooks(&self, canonical: &str) -> Vec<Box<dyn CommandHook>> {
        self.hooks
            .get(canonical)
            .map(|factories| factories.iter().map(|f| f()).collect())
            .unwrap_or_default()
    }

    fn build_parser(&self, cmd: &dyn Command, hooks: &[Box<dyn CommandHook>], name: &str) -> clap::Command {
        let prog_name = if self.interactive_mode {
            name.to_string()
        } else {
            format!("{} {}", self.name, name)
        };
        let mut parser = cmd.get_parser(&prog_name);
        let mut epilog: Vec<String> = parser
            .get_after_help()
            .map(|text| text.to_string())
            .into_iter()
            .collect();
        for hook in hooks {
            parser = hook.get_parser(parser);
            if let Some(text) = hook.get_epilog() {
                epilog.push(text);
            }
        }
        if !epilog.is_empty() {
            parser = parser.after_help(epilog.join("\n\n"));
        }
        parser
    }

    /// The full parser of `cmd` as it would be used to run it, hooks
    /// registered for `canonical` included.
    pub fn command_parser(&self, cmd: &dyn Command, canonical: &str, name: &str) -> clap::Command {
        let hooks = self.instantiate_hooks(canonical);
        self.build_parser(cmd, &hooks, name)
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .map(PathBuf::from)
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "app".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::bail;

    use super::*;
    use crate::command::base_parser;
    use crate::testing::{SharedBuffer, app_with};

    struct Echo;

    impl Command for Echo {
        fn description(&self) -> String {
            "Print the arguments.".into()
        }

        fn get_parser(&self, prog_name: &str) -> clap::Command {
            base_parser(prog_name, &self.description())
                .arg(Arg::new("words").num_args(0..).allow_hyphen_values(true))
        }

        fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32> {
            let words: Vec<String> = args
                .get_many::<String>("words")
                .map(|w| w.cloned().collect())
                .unwrap_or_default();
            writeln!(app.stdout(), "{}", words.join(" "))?;
            Ok(0)
        }
    }

    struct Fail;

    impl Command for Fail {
        fn take_action(&mut self, _app: &mut App, _args: &ArgMatches) -> Result<i32> {
            bail!("boom")
        }
    }

    fn app(out: &SharedBuffer) -> App {
        let mut app = app_with(out.clone(), "");
        let cm = app.command_manager_mut();
        cm.add_command("echo", loader("test::echo", |_| Box::new(Echo)));
        cm.add_command("fail", loader("test::fail", |_| Box::new(Fail)));
        cm.add_command("list files", loader("test::list", |_| Box::new(Echo)));
        app
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl AppLifecycle for Recorder {
        fn initialize_app(&mut self, argv: &[String]) -> Result<()> {
            self.0.lock().unwrap().push(format!("init {}", argv.join(" ")));
            Ok(())
        }

        fn prepare_to_run_command(&mut self, cmd_name: &str) -> Result<()> {
            self.0.lock().unwrap().push(format!("prepare {cmd_name}"));
            Ok(())
        }

        fn clean_up(&mut self, cmd_name: &str, result: i32, err: Option<&anyhow::Error>) -> Result<()> {
            let err = err.map(|e| e.to_string()).unwrap_or_default();
            self.0.lock().unwrap().push(format!("clean_up {cmd_name} {result} {err}"));
            Ok(())
        }
    }

    #[test]
    fn verbose_level_follows_flags() {
        let mut opts = GlobalOptions::default();
        assert_eq!(opts.verbose_level(), 1);
        opts.verbose = 2;
        assert_eq!(opts.verbose_level(), 3);
        opts.quiet = true;
        assert_eq!(opts.verbose_level(), 0);
    }

    #[test]
    fn option_parser_is_consistent() {
        let out = SharedBuffer::default();
        app(&out).option_parser().debug_assert();
    }

    #[test]
    fn runs_command_and_leaves_its_args_alone() {
        let out = SharedBuffer::default();
        let mut app = app(&out);
        assert_eq!(app.run(&["echo", "-v", "--debug", "x"]).unwrap(), 0);
        assert_eq!(out.contents(), "-v --debug x\n");
        assert!(!app.options().debug);
        assert!(!app.interactive_mode());
    }

    #[test]
    fn global_options_before_the_command() {
        let out = SharedBuffer::default();
        let mut app = app(&out);
        assert_eq!(app.run(&["-q", "--debug", "list", "files", "a"]).unwrap(), 0);
        assert!(app.options().quiet);
        assert!(app.options().debug);
        assert_eq!(out.contents(), "a\n");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["-v", "-q", "echo"]).unwrap(), 2);
    }

    #[test]
    fn version_goes_to_stdout() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["--version"]).unwrap(), 0);
        assert_eq!(out.contents(), "test 1.0\n");
    }

    #[test]
    fn help_lists_commands() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["-h"]).unwrap(), 0);
        let text = out.contents();
        assert!(text.contains("--log-file"));
        assert!(text.contains("Commands:\n"));
        assert!(text.contains("  echo           Print the arguments\n"));
    }

    #[test]
    fn deferred_help_becomes_help_command() {
        let out = SharedBuffer::default();
        let mut app = app(&out).with_deferred_help(true);
        assert_eq!(app.run(&["--help", "echo"]).unwrap(), 0);
        let text = out.contents();
        assert!(text.contains("Print the arguments."));
        assert!(text.contains("Usage: test echo"));
        assert!(!text.contains("Commands:"));
    }

    #[test]
    fn command_help_exits_zero() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["list", "files", "--help"]).unwrap(), 0);
        assert!(out.contents().contains("Usage: test list files"));
    }

    #[test]
    fn command_usage_errors_exit_two() {
        let out = SharedBuffer::default();
        let mut app = app(&out);
        app.command_manager_mut()
            .add_command("strict", loader("test::strict", |_| Box::new(Fail)));
        assert_eq!(app.run(&["strict", "--nope"]).unwrap(), 2);
    }

    #[test]
    fn unknown_command_suggests_matches() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["ehco"]).unwrap(), 2);
        assert_eq!(
            out.contents(),
            "test: 'ehco' is not a test command. See 'test --help'.\nDid you mean one of these?\n  echo\n"
        );
    }

    #[test]
    fn article_follows_app_name() {
        let out = SharedBuffer::default();
        let mut app = app(&out).with_name("app");
        assert_eq!(app.run(&["ehco"]).unwrap(), 2);
        assert!(out.contents().starts_with("app: 'ehco' is not an app command."));
    }

    #[test]
    fn unique_abbreviation_runs_the_command() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["ech", "hi"]).unwrap(), 0);
        assert!(!out.contents().contains("Did you mean"));
    }

    #[test]
    fn unknown_command_always_gets_the_closest_names() {
        let out = SharedBuffer::default();
        assert_eq!(app(&out).run(&["zzzzzzzzzzzz"]).unwrap(), 2);
        assert!(out.contents().contains("Did you mean one of these?\n"));
    }

    struct Broken;

    impl crate::command::Loader for Broken {
        fn load(&self) -> Result<crate::command::CommandFactory> {
            bail!("missing module")
        }

        fn origin(&self) -> String {
            "test::broken".into()
        }
    }

    #[test]
    fn loader_failure_exits_two() {
        let out = SharedBuffer::default();
        let mut app = app(&out);
        app.command_manager_mut().add_command("broken", Arc::new(Broken));
        assert_eq!(app.run(&["broken"]).unwrap(), 2);

        let mut app = self::app(&out);
        app.command_manager_mut().add_command("broken", Arc::new(Broken));
        let err = app.run(&["--debug", "broken"]).unwrap_err();
        let err = err.downcast::<ResolutionError>().unwrap();
        assert!(matches!(err, ResolutionError::LoaderFailure { ref name, .. } if name == "broken"));
    }

    #[test]
    fn nothing_to_resolve() {
        let out = SharedBuffer::default();
        let mut app = app(&out);
        assert_eq!(app.run_subcommand(&Vec::<String>::new()).unwrap(), 2);
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn failing_command() {
        let out = SharedBuffer::default();
        let rec = Recorder::default();
        let mut app = app(&out).with_lifecycle(Box::new(rec.clone()));
        assert_eq!(app.run(&["fail"]).unwrap(), 1);
        assert_eq!(rec.events(), vec!["init fail", "prepare fail", "clean_up fail 1 boom"]);

        let rec = Recorder::default();
        let mut app = self::app(&out).with_lifecycle(Box::new(rec.clone()));
        let err = app.run(&["--debug", "fail"]).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(rec.events().last().unwrap(), "clean_up fail 1 boom");
    }

    #[test]
    fn lifecycle_sees_typed_name() {
        let out = SharedBuffer::default();
        let rec = Recorder::default();
        let mut app = app(&out).with_lifecycle(Box::new(rec.clone()));
        app.command_manager_mut().add_legacy_command("ls", "list files");
        assert_eq!(app.run(&["ls", "x"]).unwrap(), 0);
        assert_eq!(rec.events(), vec!["init ls x", "prepare ls", "clean_up ls 0 "]);
    }

    struct FailingInit;

    impl AppLifecycle for FailingInit {
        fn initialize_app(&mut self, _argv: &[String]) -> Result<()> {
            bail!("no config")
        }
    }

    #[test]
    fn initialize_failure() {
        let out = SharedBuffer::default();
        let mut app = app(&out).with_lifecycle(Box::new(FailingInit));
        assert_eq!(app.run(&["echo"]).unwrap(), 1);

        let mut app = self::app(&out).with_lifecycle(Box::new(FailingInit));
        assert!(app.run(&["--debug", "echo"]).is_err());
    }

    struct FailingCleanUp;

    impl AppLifecycle for FailingCleanUp {
        fn clean_up(&mut self, _cmd_name: &str, _result: i32, _err: Option<&anyhow::Error>) -> Result<()> {
            bail!("cannot")
        }
    }

    #[test]
    fn clean_up_failure_keeps_result() {
        let out = SharedBuffer::default();
        let mut app = app(&out).with_lifecycle(Box::new(FailingCleanUp));
        assert_eq!(app.run(&["echo", "ok"]).unwrap(), 0);
        assert_eq!(out.contents(), "ok\n");
    }

    struct Shout {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl CommandHook for Shout {
        fn get_parser(&self, parser: clap::Command) -> clap::Command {
            parser.arg(Arg::new("shout").long("shout").action(ArgAction::SetTrue))
        }

        fn get_epilog(&self) -> Option<String> {
            Some("Hooked by shout.".into())
        }

        fn before(&mut self, app: &mut App, args: &ArgMatches) -> Result<()> {
            if args.get_flag("shout") {
                writeln!(app.stdout(), "LOUD")?;
            }
            self.seen.lock().unwrap().push("before".into());
            Ok(())
        }

        fn after(&mut self, _app: &mut App, _args: &ArgMatches, return_code: i32) -> i32 {
            self.seen.lock().unwrap().push(format!("after {return_code}"));
            return_code + 40
        }
    }

    #[test]
    fn hooks_extend_parser_and_wrap_action() {
        let out = SharedBuffer::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut app = app(&out);
        let hook_seen = seen.clone();
        app.register_hook("list files", move || {
            Box::new(Shout {
                seen: hook_seen.clone(),
            })
        });
        assert_eq!(app.run(&["list", "files", "--shout"]).unwrap(), 40);
        assert_eq!(out.contents(), "LOUD\n\n");
        assert_eq!(*seen.lock().unwrap(), vec!["before", "after 0"]);
    }

    #[test]
    fn hook_epilog_in_command_help() {
        let out = SharedBuffer::default();
        let mut app = app(&out);
        app.register_hook("echo", || {
            Box::new(Shout {
                seen: Arc::new(Mutex::new(Vec::new())),
            })
        });
        let parser = app.command_parser(&Echo, "echo", "echo");
        let help = parser.clone().render_help().to_string();
        assert!(help.contains("--shout"));
        assert!(help.contains("Hooked by shout."));
    }

    #[test]
    fn fuzzy_matches_use_separator() {
        let out = SharedBuffer::default();
        let app = app(&out);
        assert_eq!(app.get_fuzzy_matches("list"), vec!["list files"]);
        assert_eq!(app.get_fuzzy_matches("ech"), vec!["echo"]);
    }
}
