/*!
Error types for command resolution.

Command bodies, lifecycle callbacks and formatters report failures through
`anyhow::Result`; the resolution core keeps a closed enum so callers can
react to each outcome (fuzzy suggestions for `NotFound`, a plain error line
for a broken loader, a fatal startup error for the registry).
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolutionError {
    /// No prefix of argv resolved to a registered command.
    #[error("Unknown command {argv:?}")]
    NotFound { argv: Vec<String> },

    /// The entry was found but its loader could not produce a factory.
    #[error("Could not load command '{name}'")]
    LoaderFailure {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The plugin registry failed to enumerate a namespace.
    #[error("Could not enumerate commands in namespace '{namespace}'")]
    Registry {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolutionError {
    pub fn not_found<S: AsRef<str>>(argv: &[S]) -> Self {
        ResolutionError::NotFound {
            argv: argv.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_renders_argv_list() {
        let err = ResolutionError::not_found(&["image", "craete"]);
        assert_eq!(err.to_string(), r#"Unknown command ["image", "craete"]"#);
        assert!(err.is_not_found());
    }

    #[test]
    fn loader_failure_keeps_cause() {
        let err = ResolutionError::LoaderFailure {
            name: "two part".into(),
            source: anyhow::anyhow!("module missing"),
        };
        assert_eq!(err.to_string(), "Could not load command 'two part'");
        let chained = format!("{:#}", anyhow::Error::new(err));
        assert!(chained.contains("module missing"));
    }
}
