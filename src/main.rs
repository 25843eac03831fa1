use std::sync::Arc;

use anyhow::Result;
use clikit::{App, CommandManager, StaticRegistry};

mod demo;

/// clikit-demo - sample application built on clikit.
///
/// Usage:
///   clikit-demo [-v | -q] [--log-file FILE] [--debug] <command> [args...]
///   clikit-demo                 (no command: interactive shell)
///
/// Examples:
///   clikit-demo simple
///   clikit-demo list files -f csv --sort-column Size
///   clikit-demo ls              (legacy name of `list files`)
///   clikit-demo show file Cargo.toml -f shell
///   clikit-demo hooked --added-by-hook x
///   clikit-demo complete > clikit-demo.bash
fn main() -> Result<()> {
    let mut registry = StaticRegistry::new();
    demo::register(&mut registry);
    let manager = CommandManager::new(Arc::new(registry), Some(demo::NAMESPACE), true)?;

    let mut app = App::new("clikit demo app", "0.1", manager)
        .with_name("clikit-demo")
        .with_lifecycle(Box::new(demo::DemoLifecycle));
    app.command_manager_mut().add_legacy_command("ls", "list files");
    app.register_hook("hooked", || Box::new(demo::SampleHook));

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let code = app.run(&argv)?;
    std::process::exit(code);
}
