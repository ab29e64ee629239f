//! Resolution of text-rendering resources by logical name.
//!
//! The composer asks for `"regular"` and `"bold"`; where those come from is
//! the provider's business. `DirectoryFontProvider` searches candidate
//! directories for the TTF files, `BuiltinFontProvider` falls back to the
//! PDF base-14 Helvetica faces (ASCII text only).

use std::path::{Path, PathBuf};

use tracing::debug;

use super::RenderError;
use crate::config::{self, FONT_BOLD, FONT_REGULAR};

/// PDF base-14 faces the composer knows metrics for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base14 {
    Helvetica,
    HelveticaBold,
}

/// A resolved font, ready to register with the PDF document.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// TrueType bytes to embed.
    Embedded { name: String, bytes: Vec<u8> },
    /// Standard font every PDF reader ships; nothing is embedded.
    Builtin(Base14),
}

impl FontSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Embedded { name, .. } => name,
            Self::Builtin(Base14::Helvetica) => "Helvetica",
            Self::Builtin(Base14::HelveticaBold) => "Helvetica-Bold",
        }
    }
}

/// Injected capability: "give me the font called X, or fail".
pub trait FontProvider: Send + Sync {
    fn resolve(&self, logical_name: &str) -> Result<FontSource, RenderError>;

    /// Resolve every font the composer needs, so a missing resource is
    /// reported before any generation is attempted.
    fn check(&self) -> Result<(), RenderError> {
        self.resolve(FONT_REGULAR)?;
        self.resolve(FONT_BOLD)?;
        Ok(())
    }
}

// ── DirectoryFontProvider ─────────────────────────────────

/// Looks up TTF files in a list of directories, first match wins.
#[derive(Debug, Clone)]
pub struct DirectoryFontProvider {
    dirs: Vec<PathBuf>,
}

impl DirectoryFontProvider {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// `./fonts`, then `~/Installdoc/fonts`.
    pub fn default_locations() -> Self {
        Self::new(config::default_font_dirs())
    }

    pub fn single(dir: impl AsRef<Path>) -> Self {
        Self::new(vec![dir.as_ref().to_path_buf()])
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl FontProvider for DirectoryFontProvider {
    fn resolve(&self, logical_name: &str) -> Result<FontSource, RenderError> {
        let file_name =
            config::font_file_name(logical_name).ok_or_else(|| RenderError::ResourceNotFound {
                name: logical_name.to_string(),
                searched: Vec::new(),
            })?;

        let searched: Vec<PathBuf> = self.dirs.iter().map(|d| d.join(file_name)).collect();
        let Some(path) = searched.iter().find(|p| p.is_file()) else {
            return Err(RenderError::ResourceNotFound {
                name: file_name.to_string(),
                searched,
            });
        };

        let bytes = std::fs::read(path)?;
        ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| RenderError::Font(format!("{}: {e}", path.display())))?;

        debug!(font = logical_name, path = %path.display(), "Font resolved");
        Ok(FontSource::Embedded {
            name: file_name.trim_end_matches(".ttf").to_string(),
            bytes,
        })
    }
}

// ── BuiltinFontProvider ───────────────────────────────────

/// Helvetica / Helvetica-Bold. Only for documents whose text is ASCII.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFontProvider;

impl FontProvider for BuiltinFontProvider {
    fn resolve(&self, logical_name: &str) -> Result<FontSource, RenderError> {
        match logical_name {
            FONT_REGULAR => Ok(FontSource::Builtin(Base14::Helvetica)),
            FONT_BOLD => Ok(FontSource::Builtin(Base14::HelveticaBold)),
            other => Err(RenderError::ResourceNotFound {
                name: other.to_string(),
                searched: Vec::new(),
            }),
        }
    }
}

/// Latin-only TrueType face for tests; it has no Hangul glyphs.
#[cfg(test)]
pub(crate) const TEST_TTF: &[u8] = include_bytes!("../../../testdata/fonts/RobotoMedium.ttf");
