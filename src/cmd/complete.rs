/*!
complete.rs - bash completion script generation.

`app complete` prints a bash function that completes command words and
each command's options. `--shell none` prints only the data lines:

  cmds='complete help list'
  cmds_complete='-h --help --name --shell'
  cmds_list='files'
  cmds_list_files='-h --help -f --format ...'

Multi-word commands become nested entries; the value of an inner entry is
the list of words that may follow it.
*/

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Result, bail};
use clap::{Arg, ArgMatches};

use crate::app::App;
use crate::command::{Command, base_parser};
use crate::errors::ResolutionError;
use crate::formatters::string_arg;

/* ---- Word tree ---- */

#[derive(Debug, Clone)]
enum Node {
    Options(String),
    Words(BTreeMap<String, Node>),
}

/// Command words and their options, as a tree keyed by word.
#[derive(Debug, Default)]
pub struct CompleteDictionary {
    root: BTreeMap<String, Node>,
}

impl CompleteDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `words` (a command split on spaces) with its option string.
    ///
    /// When a prefix of `words` is itself a command, that command's entry
    /// gets the next word appended and the rest is stored beside it under
    /// an `_`-joined key.
    pub fn add_command<S: AsRef<str>>(&mut self, words: &[S], options: &str) {
        let Some((last, parents)) = words.split_last() else {
            return;
        };
        let parents: Vec<&str> = parents.iter().map(AsRef::as_ref).collect();
        insert(&mut self.root, &parents, last.as_ref().to_string(), options);
    }

    /// Top-level words, sorted, space separated.
    pub fn get_commands(&self) -> String {
        self.root.keys().cloned().collect::<Vec<_>>().join(" ")
    }

    /// `(path, value)` pairs for every entry, sorted by path.
    pub fn get_data(&self) -> Vec<(String, String)> {
        let mut data = Vec::new();
        collect(&self.root, "", &mut data);
        data.sort();
        data
    }
}

fn insert(level: &mut BTreeMap<String, Node>, parents: &[&str], last: String, options: &str) {
    let Some((word, rest)) = parents.split_first() else {
        level.insert(last, Node::Options(options.to_string()));
        return;
    };
    match level
        .entry(word.to_string())
        .or_insert_with(|| Node::Words(BTreeMap::new()))
    {
        Node::Options(existing) => {
            existing.push(' ');
            existing.push_str(&last);
            insert(level, rest, format!("{word}_{last}"), options);
        }
        Node::Words(children) => insert(children, rest, last, options),
    }
}

fn collect(level: &BTreeMap<String, Node>, path: &str, out: &mut Vec<(String, String)>) {
    for (word, node) in level {
        let name = if path.is_empty() {
            word.clone()
        } else {
            format!("{path}_{word}")
        };
        match node {
            Node::Options(options) => out.push((name, options.clone())),
            Node::Words(children) => {
                let words: Vec<&str> = children.keys().map(String::as_str).collect();
                out.push((name.clone(), words.join(" ")));
                collect(children, &name, out);
            }
        }
    }
}

/* ---- Shells ---- */

const BASH_HEADER: &str = "()
{
  local cur prev words
  COMPREPLY=()
  _get_comp_words_by_ref -n : cur prev words

  # Command data:
";

const BASH_TRAILER: &str = r#"
  cmd=""
  words[0]=""
  completed="${cmds}" 
  for var in "${words[@]:1}"
  do
    if [[ ${var} == -* ]] ; then
      break
    fi
    if [ -z "${cmd}" ] ; then
      proposed="${var}"
    else
      proposed="${cmd}_${var}"
    fi
    local i="cmds_${proposed}"
    local comp="${!i}"
    if [ -z "${comp}" ] ; then
      break
    fi
    if [[ ${comp} == -* ]] ; then
      if [[ ${cur} != -* ]] ; then
        completed=""
        break
      fi
    fi
    cmd="${proposed}"
    completed="${comp}"
  done

  if [ -z "${completed}" ] ; then
    COMPREPLY=( $( compgen -f -- "$cur" ) $( compgen -d -- "$cur" ) )
  else
    COMPREPLY=( $(compgen -W "${completed}" -- ${cur}) )
  fi
  return 0
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    None,
}

impl Shell {
    pub const NAMES: [&'static str; 2] = ["bash", "none"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bash" => Some(Shell::Bash),
            "none" => Some(Shell::None),
            _ => None,
        }
    }

    fn header(self, name: &str) -> String {
        match self {
            Shell::Bash => format!("_{}{BASH_HEADER}", name.replace('-', "_")),
            Shell::None => String::new(),
        }
    }

    fn trailer(self, name: &str) -> String {
        match self {
            Shell::Bash => format!(
                "{BASH_TRAILER}complete -F _{} {name}\n",
                name.replace('-', "_")
            ),
            Shell::None => String::new(),
        }
    }

    pub fn write(
        self,
        out: &mut dyn Write,
        name: &str,
        commands: &str,
        data: &[(String, String)],
    ) -> Result<()> {
        out.write_all(self.header(name).as_bytes())?;
        writeln!(out, "  cmds='{commands}'")?;
        for (path, value) in data {
            writeln!(out, "  cmds_{}='{value}'", path.replace('-', "_"))?;
        }
        out.write_all(self.trailer(name).as_bytes())?;
        Ok(())
    }
}

/* ---- complete command ---- */

#[derive(Debug, Default)]
pub struct CompleteCommand;

impl Command for CompleteCommand {
    fn description(&self) -> String {
        "print bash completion command".into()
    }

    fn get_parser(&self, prog_name: &str) -> clap::Command {
        base_parser(prog_name, &self.description())
            .arg(
                Arg::new("name")
                    .long("name")
                    .value_name("COMMAND_NAME")
                    .help("Command name to support with command completion"),
            )
            .arg(
                Arg::new("shell")
                    .long("shell")
                    .value_name("SHELL")
                    .value_parser(Shell::NAMES)
                    .default_value("bash")
                    .help("Shell being used. Use none for data only (default: bash)"),
            )
    }

    fn take_action(&mut self, app: &mut App, args: &ArgMatches) -> Result<i32> {
        let name = string_arg(args, "name").unwrap_or_else(|| app.name().to_string());
        let shell_name = string_arg(args, "shell").unwrap_or_else(|| "bash".into());
        let Some(shell) = Shell::parse(&shell_name) else {
            bail!("Unknown shell syntax '{shell_name}'");
        };

        let names: Vec<String> = app.command_manager().names().map(str::to_string).collect();
        let mut dictionary = CompleteDictionary::new();
        for command in names {
            let words: Vec<&str> = command.split_whitespace().collect();
            let options = command_options(app, &words)?;
            dictionary.add_command(&words, &options);
        }
        tracing::debug!("{} completion entries", dictionary.get_data().len());

        shell.write(
            app.stdout(),
            &name,
            &dictionary.get_commands(),
            &dictionary.get_data(),
        )?;
        Ok(0)
    }
}

/// Option strings of a command's parser: `-h --help` first, then every
/// optional argument in declaration order.
fn command_options(app: &App, words: &[&str]) -> Result<String> {
    let found = app.command_manager().find_command(words)?;
    let factory = found
        .entry
        .load()
        .map_err(|source| ResolutionError::LoaderFailure {
            name: found.canonical.clone(),
            source,
        })?;
    let cmd = factory(&found.name);
    let parser = app.command_parser(cmd.as_ref(), &found.canonical, &found.name);
    Ok(option_strings(&parser).join(" "))
}

pub fn option_strings(parser: &clap::Command) -> Vec<String> {
    let mut strings = vec!["-h".to_string(), "--help".to_string()];
    for arg in parser.get_arguments() {
        if arg.is_positional() || arg.get_id() == "help" {
            continue;
        }
        if let Some(short) = arg.get_short() {
            strings.push(format!("-{short}"));
        }
        if let Some(long) = arg.get_long() {
            strings.push(format!("--{long}"));
        }
    }
    strings
}
