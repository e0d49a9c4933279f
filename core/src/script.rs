use std::path::PathBuf;

use crate::TacErrorExt;

/// One PHP translation unit: the file name used in diagnostics, where it
/// came from, and its full source text.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl Script {
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn TacErrorExt>> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::<dyn TacErrorExt>::from(Box::new(MissingScriptError {
                path: path.clone(),
                reason: e.to_string(),
            }))
        })?;
        Ok(Script {
            name,
            path,
            content,
        })
    }

    /// Builds a script from in-memory source, mainly for tests and stdin.
    pub fn from_source(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Script {
            path: PathBuf::from(&name),
            name,
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Script: {} at {:?}", self.name, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MissingScriptError {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for MissingScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Missing script at {:?} ({})", self.path, self.reason)
    }
}

impl std::error::Error for MissingScriptError {}

impl TacErrorExt for MissingScriptError {
    fn level(&self) -> crate::Level {
        crate::Level::Error
    }

    fn message(&self) -> String {
        format!("Could not read script at {:?}: {}", self.path, self.reason)
    }

    fn issuer(&self) -> String {
        "phptac.script".to_string()
    }

    fn span(&self) -> Option<crate::location::Span> {
        None
    }

    fn location(&self) -> Option<crate::location::Location> {
        None
    }
}
