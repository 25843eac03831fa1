/*!
Built-in commands registered on every application.

  src/cmd/
    mod.rs        (this file)
    help.rs       (HelpCommand + print_app_help, also behind `-h`)
    complete.rs   (CompleteCommand + CompleteDictionary, bash completion)

Conventions:
  - Commands write through `App::stdout` so output can be captured.
  - Parsers come from `command::base_parser` and are extended, never
    built from scratch.
*/

pub mod complete;
pub mod help;

pub use complete::{CompleteCommand, CompleteDictionary, Shell};
pub use help::{HelpCommand, print_app_help};
