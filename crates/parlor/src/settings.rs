//! The settings file: a port and the card catalog.
//!
//! Line-oriented text: the first line is the TCP port, then a blank
//! line, then card names one per line with blank lines separating
//! categories. Category order in the file is catalog order on the
//! wire.

use std::path::Path;

use parlor_protocol::{Catalog, CatalogError, MAX_NAME_LEN};

/// Errors reading or parsing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected a port number between 1 and 65535")]
    BadPort { line: usize },

    #[error("line {line}: expected a blank line after the port")]
    ExpectedBlank { line: usize },

    #[error("line {line}: card name longer than {MAX_NAME_LEN} bytes")]
    NameTooLong { line: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Parsed server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub catalog: Catalog,
}

/// Reads and parses the settings file at `path`.
pub fn load(path: &Path) -> Result<Settings, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

/// Parses settings from text. See the module docs for the format.
pub fn parse(text: &str) -> Result<Settings, SettingsError> {
    let mut lines = text.lines().enumerate();

    let (_, first) = lines.next().ok_or(SettingsError::BadPort { line: 1 })?;
    let port: u16 = first
        .trim()
        .parse()
        .map_err(|_| SettingsError::BadPort { line: 1 })?;
    if port == 0 {
        return Err(SettingsError::BadPort { line: 1 });
    }

    match lines.next() {
        Some((_, line)) if line.trim().is_empty() => {}
        Some((i, _)) => return Err(SettingsError::ExpectedBlank { line: i + 1 }),
        // No card section at all; Catalog::new reports the empty deck.
        None => {}
    }

    let mut categories: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for (i, line) in lines {
        let name = line.trim();
        if name.is_empty() {
            if !current.is_empty() {
                categories.push(std::mem::take(&mut current));
            }
            continue;
        }
        if name.len() > MAX_NAME_LEN {
            return Err(SettingsError::NameTooLong { line: i + 1 });
        }
        current.push(name.to_string());
    }
    if !current.is_empty() {
        categories.push(current);
    }

    let catalog = Catalog::new(categories)?;
    Ok(Settings { port, catalog })
}
