use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// Families tried, in order, before falling back to the generic sans-serif query.
const PREFERRED_FAMILIES: [&str; 4] = ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"];

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Where the text font comes from.
pub enum FontSource {
    /// A `.ttf`/`.otf`/`.ttc` file on disk.
    File(PathBuf),
    /// First preferred sans-serif face found among system fonts and `./fonts`.
    System,
}

#[derive(Clone)]
/// Font bytes plus face index, shared by text layout and the rasterizer.
pub struct ResolvedFont {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
    /// Human-readable origin (file path or system family name) for diagnostics.
    pub origin: String,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("origin", &self.origin)
            .finish()
    }
}

pub fn resolve_font(source: &FontSource) -> ReelResult<ResolvedFont> {
    match source {
        FontSource::File(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read font file '{}'", path.display()))?;
            Ok(ResolvedFont {
                bytes: Arc::new(bytes),
                index: 0,
                origin: path.display().to_string(),
            })
        }
        FontSource::System => resolve_system_font(),
    }
}

fn resolve_system_font() -> ReelResult<ResolvedFont> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    load_fonts_from_dir(&mut db, Path::new("fonts"));
    load_fonts_from_dir(&mut db, Path::new("assets"));

    let mut families = PREFERRED_FAMILIES
        .iter()
        .map(|name| usvg::fontdb::Family::Name(*name))
        .collect::<Vec<_>>();
    families.push(usvg::fontdb::Family::SansSerif);

    let query = usvg::fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| {
            ReelError::validation(
                "no usable font found on this system; pass one explicitly with --font",
            )
        })?;

    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "unknown".to_string());
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| ReelError::evaluation(format!("failed to load font data for '{family}'")))?;

    tracing::debug!(family = %family, face_index = index, "resolved system font");
    Ok(ResolvedFont {
        bytes: Arc::new(bytes),
        index,
        origin: format!("system:{family}"),
    })
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
