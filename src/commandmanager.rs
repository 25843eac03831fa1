/*!
Command discovery and lookup.

`CommandManager` owns:
  - the registry: insertion-ordered `name -> CommandEntry`, merged from one or
    more plugin namespaces plus directly added commands
  - the legacy alias table: retired name -> current name
  - the list of namespaces loaded so far

Lookup (`find_command`) takes the longest run of leading non-option words
that names a command, either exactly, through a legacy alias, or as a
word-by-word abbreviation that matches exactly one registered name.
Ambiguous abbreviations are skipped, never guessed.
*/

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::command::{CommandFactory, Loader};
use crate::errors::ResolutionError;

/* -------------------------------------------------------------------------- */
/* Plugin registry                                                            */
/* -------------------------------------------------------------------------- */

/// One `(name, loader)` pair reported by a registry.
#[derive(Clone)]
pub struct PluginEntry {
    pub name: String,
    pub loader: Arc<dyn Loader>,
}

/// Source of command entries, grouped by namespace.
pub trait PluginRegistry: Send + Sync {
    /// Entries registered under `namespace`, in a stable order.
    fn enumerate(&self, namespace: &str) -> Result<Vec<PluginEntry>>;
}

/// Registry backed by an in-memory table filled at startup.
#[derive(Default, Clone)]
pub struct StaticRegistry {
    namespaces: HashMap<String, Vec<PluginEntry>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        namespace: &str,
        name: &str,
        loader: Arc<dyn Loader>,
    ) -> &mut Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .push(PluginEntry {
                name: name.to_string(),
                loader,
            });
        self
    }
}

impl PluginRegistry for StaticRegistry {
    fn enumerate(&self, namespace: &str) -> Result<Vec<PluginEntry>> {
        Ok(self.namespaces.get(namespace).cloned().unwrap_or_default())
    }
}

/* -------------------------------------------------------------------------- */
/* Entries                                                                    */
/* -------------------------------------------------------------------------- */

#[derive(Clone)]
pub struct CommandEntry {
    loader: Arc<dyn Loader>,
}

impl CommandEntry {
    pub fn new(loader: Arc<dyn Loader>) -> Self {
        Self { loader }
    }

    pub fn load(&self) -> Result<CommandFactory> {
        self.loader.load()
    }

    pub fn origin(&self) -> String {
        self.loader.origin()
    }

    /// True when both entries share one loader instance.
    pub fn same_loader(&self, other: &CommandEntry) -> bool {
        Arc::ptr_eq(&self.loader, &other.loader)
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CommandEntry").field(&self.origin()).finish()
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct FoundCommand {
    pub entry: CommandEntry,
    /// Name as the user typed it (before alias substitution or abbreviation expansion).
    pub name: String,
    /// Registry key the entry is stored under.
    pub canonical: String,
    /// Arguments left for the command's own parser.
    pub remaining: Vec<String>,
}

/* -------------------------------------------------------------------------- */
/* Manager                                                                    */
/* -------------------------------------------------------------------------- */

pub struct CommandManager {
    registry: Arc<dyn PluginRegistry>,
    namespace: Option<String>,
    convert_underscores: bool,
    commands: Vec<(String, CommandEntry)>,
    index: HashMap<String, usize>,
    legacy: HashMap<String, String>,
    group_list: Vec<String>,
}

impl CommandManager {
    /// Create a manager, loading `namespace` right away when given.
    pub fn new(
        registry: Arc<dyn PluginRegistry>,
        namespace: Option<&str>,
        convert_underscores: bool,
    ) -> Result<Self, ResolutionError> {
        let mut manager = Self {
            registry,
            namespace: namespace.map(str::to_string),
            convert_underscores,
            commands: Vec::new(),
            index: HashMap::new(),
            legacy: HashMap::new(),
            group_list: Vec::new(),
        };
        if let Some(ns) = namespace {
            manager.load_commands(ns)?;
        }
        Ok(manager)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn convert_underscores(&self) -> bool {
        self.convert_underscores
    }

    /// Merge every entry of `namespace` into the registry.
    ///
    /// A name that is already registered is replaced (last loaded wins) and
    /// the collision is reported at WARN level with both origins. No warning
    /// is logged when both entries hold the same loader `Arc`, whether they
    /// come from a reload or from one namespace listing it twice.
    pub fn load_commands(&mut self, namespace: &str) -> Result<(), ResolutionError> {
        let entries =
            self.registry
                .enumerate(namespace)
                .map_err(|source| ResolutionError::Registry {
                    namespace: namespace.to_string(),
                    source,
                })?;
        for plugin in entries {
            let name = self.display_name(&plugin.name);
            tracing::debug!("found command {name:?}");
            let entry = CommandEntry::new(plugin.loader);
            if let Some(existing) = self.get(&name)
                && !existing.same_loader(&entry)
            {
                tracing::warn!(
                    "found duplicate command {name:?}: {} replaces {}",
                    entry.origin(),
                    existing.origin()
                );
            }
            self.insert(name, entry);
        }
        self.group_list.push(namespace.to_string());
        Ok(())
    }

    /// Register (or overwrite) one command directly.
    pub fn add_command(&mut self, name: &str, loader: Arc<dyn Loader>) {
        self.insert(name.to_string(), CommandEntry::new(loader));
    }

    /// Make `old_name` resolve to whatever `new_name` resolves to at lookup time.
    pub fn add_legacy_command(&mut self, old_name: &str, new_name: &str) {
        self.legacy
            .insert(old_name.to_string(), new_name.to_string());
    }

    /// Load an additional namespace; an empty group name is ignored.
    pub fn add_command_group(&mut self, group: &str) -> Result<(), ResolutionError> {
        if group.is_empty() {
            return Ok(());
        }
        self.load_commands(group)
    }

    pub fn get_command_groups(&self) -> &[String] {
        &self.group_list
    }

    /// Registered names, or the names a registry namespace reports right now.
    pub fn get_command_names(&self, group: Option<&str>) -> Result<Vec<String>, ResolutionError> {
        match group {
            Some(ns) => {
                let entries =
                    self.registry
                        .enumerate(ns)
                        .map_err(|source| ResolutionError::Registry {
                            namespace: ns.to_string(),
                            source,
                        })?;
                Ok(entries
                    .iter()
                    .map(|e| self.display_name(&e.name))
                    .collect())
            }
            None => Ok(self.commands.iter().map(|(n, _)| n.clone()).collect()),
        }
    }

    /// Resolve the leading words of `argv` to a registered command.
    pub fn find_command<S: AsRef<str>>(&self, argv: &[S]) -> Result<FoundCommand, ResolutionError> {
        let words: Vec<&str> = argv.iter().map(AsRef::as_ref).collect();
        let cut = words
            .iter()
            .position(|w| w.starts_with('-'))
            .unwrap_or(words.len());

        for i in (1..=cut).rev() {
            let typed = &words[..i];
            let return_name = typed.join(" ");
            let lookup = self
                .legacy
                .get(&return_name)
                .cloned()
                .unwrap_or_else(|| return_name.clone());

            let canonical = if self.index.contains_key(&lookup) {
                Some(lookup)
            } else {
                match classify(match_by_partial_name(typed, self.names())) {
                    PartialMatch::Unique(name) => Some(name.to_string()),
                    PartialMatch::Ambiguous(count) => {
                        tracing::trace!("{return_name:?} abbreviates {count} commands, skipping");
                        None
                    }
                    PartialMatch::None => None,
                }
            };

            if let Some(canonical) = canonical
                && let Some(entry) = self.get(&canonical)
            {
                return Ok(FoundCommand {
                    entry: entry.clone(),
                    name: return_name,
                    canonical,
                    remaining: words[i..].iter().map(|w| w.to_string()).collect(),
                });
            }
        }
        Err(ResolutionError::not_found(&words))
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.index.get(name).map(|&i| &self.commands[i].1)
    }

    /// `(name, entry)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandEntry)> {
        self.commands.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn display_name(&self, raw: &str) -> String {
        if self.convert_underscores {
            raw.replace('_', " ")
        } else {
            raw.to_string()
        }
    }

    fn insert(&mut self, name: String, entry: CommandEntry) {
        match self.index.get(&name) {
            Some(&i) => self.commands[i].1 = entry,
            None => {
                self.index.insert(name.clone(), self.commands.len());
                self.commands.push((name, entry));
            }
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Abbreviations                                                              */
/* -------------------------------------------------------------------------- */

enum PartialMatch<'a> {
    None,
    Unique(&'a str),
    Ambiguous(usize),
}

fn classify(mut matches: Vec<&str>) -> PartialMatch<'_> {
    match matches.len() {
        0 => PartialMatch::None,
        1 => PartialMatch::Unique(matches.remove(0)),
        n => PartialMatch::Ambiguous(n),
    }
}

/// Candidates with as many words as `words` where each word starts with
/// the corresponding typed word.
pub fn match_by_partial_name<'a, I>(words: &[&str], candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|candidate| {
            let parts: Vec<&str> = candidate.split_whitespace().collect();
            parts.len() == words.len()
                && parts.iter().zip(words).all(|(part, word)| part.starts_with(word))
        })
        .collect()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
