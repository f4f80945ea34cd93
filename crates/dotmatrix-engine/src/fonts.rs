//! Consumer-supplied fonts for the text overlay and ASCII dots.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::FontArc;
use tracing::{debug, warn};

use crate::{EngineError, Result};

const VALID_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// A set of named fonts plus optional monospace and fallback faces.
#[derive(Clone, Default)]
pub struct FontBook {
    families: HashMap<String, FontArc>,
    monospace: Option<FontArc>,
    fallback: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.families.keys().collect();
        names.sort();
        f.debug_struct("FontBook")
            .field("families", &names)
            .field("monospace", &self.monospace.is_some())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Normalize a family name: lowercase, separators dropped.
fn family_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font under a family name. The first font registered
    /// also becomes the fallback.
    pub fn insert(&mut self, family: &str, font: FontArc) {
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.families.insert(family_key(family), font);
    }

    /// Parse and register font bytes under a family name.
    pub fn insert_bytes(&mut self, family: &str, data: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(data)
            .map_err(|e| EngineError::Font(format!("{family}: {e}")))?;
        self.insert(family, font);
        Ok(())
    }

    /// Builder: set the monospace face used for ASCII dots.
    pub fn with_monospace(mut self, font: FontArc) -> Self {
        self.monospace = Some(font);
        self
    }

    /// Builder: set the face used when a family is not registered.
    pub fn with_fallback(mut self, font: FontArc) -> Self {
        self.fallback = Some(font);
        self
    }

    /// Register every `.ttf`/`.otf` file in `dir`, named by file stem.
    ///
    /// Files whose stem mentions "mono" become the monospace face if none is
    /// set yet. Unparseable files are skipped with a warning. Returns the
    /// number of fonts registered.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| VALID_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let data = std::fs::read(&path)?;
            match FontArc::try_from_vec(data) {
                Ok(font) => {
                    if self.monospace.is_none() && stem.to_lowercase().contains("mono") {
                        self.monospace = Some(font.clone());
                    }
                    self.insert(stem, font);
                    loaded += 1;
                    debug!(path = %path.display(), "Registered font");
                }
                Err(e) => warn!(path = %path.display(), "Skipping unreadable font: {e}"),
            }
        }
        Ok(loaded)
    }

    /// Look up a family, falling back to the fallback face.
    pub fn resolve(&self, family: &str) -> Option<&FontArc> {
        self.families
            .get(&family_key(family))
            .or(self.fallback.as_ref())
    }

    /// The face used for ASCII dots, if any.
    pub fn monospace(&self) -> Option<&FontArc> {
        self.monospace.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.monospace.is_none() && self.fallback.is_none()
    }
}
