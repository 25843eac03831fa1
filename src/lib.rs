/*!
clikit - a framework for command-line applications built from many
subcommands.

  - `commandmanager` : registry of commands, multi-word and abbreviated
                       lookup, legacy aliases, command groups
  - `app`            : global options, dispatch, lifecycle callbacks, hooks
  - `interactive`    : shell used when no command is given
  - `lister`/`show`  : commands that emit rows / one record through the
                       `formatters` (table, csv, json, yaml, shell, value)
  - `cmd`            : built-in `help` and `complete`

Minimal application:

```no_run
use std::sync::Arc;
use clikit::{App, CommandManager, StaticRegistry};

fn main() -> anyhow::Result<()> {
    let manager = CommandManager::new(Arc::new(StaticRegistry::new()), None, true)?;
    let mut app = App::new("Does things.", "1.0", manager);
    let argv: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(app.run(&argv)?);
}
```
*/

pub mod app;
pub mod cmd;
pub mod columns;
pub mod command;
pub mod commandmanager;
pub mod display;
pub mod errors;
pub mod formatters;
pub mod fuzzy;
pub mod interactive;
pub mod lister;
pub mod show;
pub mod utils;

pub use app::{App, AppLifecycle, GlobalOptions};
pub use columns::{Cell, FormattableColumn};
pub use command::{Command, CommandHook, Loader, base_parser, loader};
pub use commandmanager::{CommandManager, FoundCommand, PluginEntry, PluginRegistry, StaticRegistry};
pub use errors::ResolutionError;
pub use lister::{ListCommand, Lister, Rows};
pub use show::{Record, ShowCommand, ShowOne};
