/*!
demo.rs - commands of the `clikit-demo` binary.

  simple / two part   print a greeting
  error               always fails
  list files / files  name and size of the entries in the current directory
  file / show file    details about one file
  unicode             some non-ASCII text
  hooked              command with the `sample-hook` extension attached
*/

use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches};
use clikit::{
    App, AppLifecycle, Cell, Command, CommandHook, ListCommand, Lister, Record, Rows, ShowCommand,
    ShowOne, StaticRegistry, loader,
};

pub const NAMESPACE: &str = "clikit.demo";

/// Fill `registry` with the demo commands.
pub fn register(registry: &mut StaticRegistry) {
    registry
        .register(NAMESPACE, "simple", loader("demo::simple", |_| Box::new(Simple)))
        .register(NAMESPACE, "two_part", loader("demo::simple", |_| Box::new(Simple)))
        .register(NAMESPACE, "error", loader("demo::error", |_| Box::new(Error)))
        .register(
            NAMESPACE,
            "list files",
            loader("demo::files", |_| Box::new(ListCommand::new(Files))),
        )
        .register(
            NAMESPACE,
            "files",
            loader("demo::files", |_| Box::new(ListCommand::new(Files))),
        )
        .register(
            NAMESPACE,
            "file",
            loader("demo::file", |_| Box::new(ShowCommand::new(File))),
        )
        .register(
            NAMESPACE,
            "show file",
            loader("demo::file", |_| Box::new(ShowCommand::new(File))),
        )
        .register(
            NAMESPACE,
            "unicode",
            loader("demo::unicode", |_| Box::new(ListCommand::new(Encoding))),
        )
        .register(NAMESPACE, "hooked", loader("demo::hooked", |_| Box::new(Hooked)));
}

/* ---- Lifecycle ---- */

pub struct DemoLifecycle;

impl AppLifecycle for DemoLifecycle {
    fn initialize_app(&mut self, _argv: &[String]) -> Result<()> {
        tracing::debug!("initialize_app");
        Ok(())
    }

    fn prepare_to_run_command(&mut self, cmd_name: &str) -> Result<()> {
        tracing::debug!("prepare_to_run_command {cmd_name}");
        Ok(())
    }

    fn clean_up(&mut self, cmd_name: &str, _result: i32, err: Option<&anyhow::Error>) -> Result<()> {
        tracing::debug!("clean_up {cmd_name}");
        if let Some(err) = err {
            tracing::debug!("got an error: {err:#}");
        }
        Ok(())
    }
}

/* ---- Plain commands ---- */

struct Simple;

impl Command for Simple {
    fn description(&self) -> String {
        "A simple command that prints a message.".into()
    }

    fn take_action(&mut self, app: &mut App, _args: &ArgMatches) -> Result<i32> {
        tracing::info!("sending greeting");
        tracing::debug!("debugging");
        writeln!(app.stdout(), "hi!")?;
        Ok(0)
    }
}

struct Error;

impl Command for Error {
    fn description(&self) -> String {
        "Always raises an error".into()
    }

    fn take_action(&mut self, _app: &mut App, _args: &ArgMatches) -> Result<i32> {
        tracing::info!("causing error");
        bail!("this is the expected exception")
    }
}

/* ---- Display commands ---- */

struct Files;

impl Lister for Files {
    fn description(&self) -> String {
        "Show a list of files in the current directory.\n\nThe file name and size are printed by default.".into()
    }

    fn take_action(&mut self, _app: &mut App, _args: &ArgMatches) -> Result<Rows> {
        let mut rows = Vec::new();
        for entry in std::fs::read_dir(".").context("Failed to read current directory")? {
            let entry = entry?;
            let size = entry.metadata().map(|m| m.len()).ok();
            rows.push(vec![
                Cell::from(entry.file_name().to_string_lossy().into_owned()),
                Cell::from(size),
            ]);
        }
        rows.sort_by_key(|r| r[0].human_readable());
        Ok((vec!["Name".into(), "Size".into()], rows))
    }
}

struct File;

impl ShowOne for File {
    fn description(&self) -> String {
        "Show details about a file".into()
    }

    fn get_parser(&self, parser: clap::Command) -> clap::Command {
        parser.arg(Arg::new("filename").default_value("."))
    }

    fn take_action(&mut self, _app: &mut App, args: &ArgMatches) -> Result<Record> {
        let filename = args
            .get_one::<String>("filename")
            .cloned()
            .unwrap_or_else(|| ".".into());
        let meta = std::fs::metadata(Path::new(&filename))
            .with_context(|| format!("Failed to stat '{filename}'"))?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64());
        let (uid, gid) = owner(&meta);

        let columns = ["Name", "Size", "UID", "GID", "Modified Time"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let data = vec![
            Cell::from(filename),
            Cell::from(meta.len()),
            Cell::from(uid),
            Cell::from(gid),
            Cell::from(modified),
        ];
        Ok((columns, data))
    }
}

#[cfg(unix)]
fn owner(meta: &std::fs::Metadata) -> (Option<u64>, Option<u64>) {
    use std::os::unix::fs::MetadataExt;
    (Some(u64::from(meta.uid())), Some(u64::from(meta.gid())))
}

#[cfg(not(unix))]
fn owner(_meta: &std::fs::Metadata) -> (Option<u64>, Option<u64>) {
    (None, None)
}

struct Encoding;

impl Lister for Encoding {
    fn description(&self) -> String {
        "Show some unicode text".into()
    }

    fn take_action(&mut self, _app: &mut App, _args: &ArgMatches) -> Result<Rows> {
        let messages = ["pi: π", "GB18030:鼀丅㐀ٸཌྷᠧꌢ€"];
        let rows = messages
            .iter()
            .map(|m| vec![Cell::from(bytes_literal(m.as_bytes())), Cell::from(*m)])
            .collect();
        Ok((vec!["UTF-8".into(), "Unicode".into()], rows))
    }
}

/// `b'...'` rendering of raw bytes, non-printable ones as `\xNN`.
fn bytes_literal(bytes: &[u8]) -> String {
    let mut out = String::from("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('\'');
    out
}

/* ---- Hooks ---- */

struct Hooked;

impl Command for Hooked {
    fn description(&self) -> String {
        "A command to demonstrate how the hooks work".into()
    }

    fn take_action(&mut self, app: &mut App, _args: &ArgMatches) -> Result<i32> {
        writeln!(app.stdout(), "this command has an extension")?;
        Ok(0)
    }
}

/// Hook sample for the `hooked` command.
pub struct SampleHook;

impl CommandHook for SampleHook {
    fn get_parser(&self, parser: clap::Command) -> clap::Command {
        tracing::debug!("sample hook get_parser()");
        parser.arg(Arg::new("added_by_hook").long("added-by-hook"))
    }

    fn get_epilog(&self) -> Option<String> {
        Some("extension epilog text".into())
    }

    fn before(&mut self, app: &mut App, _args: &ArgMatches) -> Result<()> {
        writeln!(app.stdout(), "before")?;
        Ok(())
    }

    fn after(&mut self, app: &mut App, _args: &ArgMatches, return_code: i32) -> i32 {
        if let Err(err) = writeln!(app.stdout(), "after") {
            tracing::warn!("sample hook: {err}");
        }
        return_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_escaped_like_literals() {
        assert_eq!(bytes_literal("pi: π".as_bytes()), "b'pi: \\xcf\\x80'");
        assert_eq!(bytes_literal(b"a\\b\n"), "b'a\\\\b\\x0a'");
    }

    #[test]
    fn every_demo_command_is_registered() {
        use clikit::PluginRegistry;

        let mut registry = StaticRegistry::new();
        register(&mut registry);
        let names: Vec<String> = registry
            .enumerate(NAMESPACE)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "simple", "two_part", "error", "list files", "files", "file", "show file",
                "unicode", "hooked"
            ]
        );
    }
}
