//! Font discovery: an explicit, run-once scan of font directories that maps family names to
//! font files.

use crate::foundation::error::{KinemojiError, KinemojiResult};
use anyhow::Context as _;
use parley::fontique::{Collection, CollectionOptions, FontInfo, FontStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Resolves a font family name to a concrete font file.
pub trait FontResolver {
    /// Return the file backing `family`, or a [`KinemojiError::Font`] when it is unknown.
    fn resolve(&self, family: &str) -> KinemojiResult<PathBuf>;
}

#[derive(Clone, Debug, PartialEq)]
struct FamilyEntry {
    name: String,
    path: PathBuf,
    distance: f32,
}

/// Family-name index over the font files found under a set of directories.
///
/// Lookups are case-insensitive. Only the first face of a collection file is indexed. When
/// several files declare the same family, the face closest to regular upright wins; ties go to
/// the file scanned first, so earlier directories take priority.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    families: BTreeMap<String, FamilyEntry>,
}

impl FontRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dirs` recursively and register every font file found.
    ///
    /// Missing directories are skipped. Unreadable or unparsable font files are logged and
    /// skipped.
    pub fn init(dirs: &[PathBuf]) -> KinemojiResult<Self> {
        let mut registry = Self::new();
        for dir in dirs {
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "font directory not found, skipping");
                continue;
            }
            let mut files = Vec::new();
            collect_font_files(dir, &mut files)?;
            files.sort();
            for file in files {
                if let Err(e) = registry.register_file(&file) {
                    tracing::warn!(path = %file.display(), error = %e, "skipping font file");
                }
            }
        }
        tracing::debug!(families = registry.len(), "font registry initialised");
        Ok(registry)
    }

    /// Register one font file and return the family names it declares.
    pub fn register_file(&mut self, path: &Path) -> KinemojiResult<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|e| {
            KinemojiError::font(format!("read font file '{}': {e}", path.display()))
        })?;
        let mut collection = isolated_collection();
        let faces = register_primary_face(&mut collection, bytes);
        if faces.is_empty() {
            return Err(KinemojiError::font(format!(
                "'{}' contains no usable font faces",
                path.display()
            )));
        }
        for (name, distance) in &faces {
            let entry = FamilyEntry {
                name: name.clone(),
                path: path.to_path_buf(),
                distance: *distance,
            };
            match self.families.get_mut(&name.to_lowercase()) {
                Some(existing) if existing.distance <= *distance => {}
                Some(existing) => *existing = entry,
                None => {
                    self.families.insert(name.to_lowercase(), entry);
                }
            }
        }
        Ok(faces.into_iter().map(|(name, _)| name).collect())
    }

    /// Number of distinct families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether no family is registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Registered family names as declared by their fonts, sorted case-insensitively.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.values().map(|e| e.name.as_str())
    }
}

impl FontResolver for FontRegistry {
    fn resolve(&self, family: &str) -> KinemojiResult<PathBuf> {
        self.families
            .get(&family.to_lowercase())
            .map(|e| e.path.clone())
            .ok_or_else(|| {
                KinemojiError::font(format!("font family '{family}' is not registered"))
            })
    }
}

/// A font collection that never sees system fonts, so lookups cannot fall back to them.
pub(crate) fn isolated_collection() -> Collection {
    Collection::new(CollectionOptions {
        shared: false,
        system_fonts: false,
    })
}

/// Register the faces in `bytes` with `collection`, keeping only face 0.
///
/// Faces at other collection indices are unregistered again, so a family lookup in
/// `collection` can only select face 0. Returns face 0's family names with its
/// `regular_distance`.
pub(crate) fn register_primary_face(
    collection: &mut Collection,
    bytes: Vec<u8>,
) -> Vec<(String, f32)> {
    let registered = collection.register_fonts(parley::fontique::Blob::from(bytes), None);
    let mut primary = Vec::new();
    for (family, fonts) in registered {
        let face0 = fonts.iter().find(|f| f.index() == 0);
        let attrs = |f: &FontInfo| (f.width(), f.style(), f.weight());
        for other in fonts.iter().filter(|f| f.index() != 0) {
            if face0.is_some_and(|f| attrs(f) == attrs(other)) {
                continue;
            }
            collection.unregister_font(family, other.width(), other.style(), other.weight());
        }
        let Some(face0) = face0 else {
            continue;
        };
        if let Some(name) = collection.family_name(family) {
            primary.push((name.to_owned(), regular_distance(face0)));
        }
    }
    primary
}

/// How far a face is from regular weight, upright style and normal width. Zero is an exact
/// match; any slant outweighs every weight difference.
fn regular_distance(font: &FontInfo) -> f32 {
    let slant = match font.style() {
        FontStyle::Normal => 0.0,
        _ => 1000.0,
    };
    let width = (font.width().ratio() - 1.0).abs() * 400.0;
    slant + width + (font.weight().value() - 400.0).abs()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}

fn collect_font_files(dir: &Path, out: &mut Vec<PathBuf>) -> KinemojiResult<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read font directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list font directory '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, out)?;
        } else if is_font_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/text/registry.rs"]
mod tests;
