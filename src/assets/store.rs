use std::{collections::HashMap, hash::Hasher as _, sync::Arc};

use kurbo::Shape;

use crate::{
    assets::fonts::ResolvedFont,
    compile::trim::path_length,
    composition::model::{self, PathStyle},
    foundation::core::{BezPath, Rect, Rgba8Premul},
    foundation::error::{ReelError, ReelResult},
    foundation::math::Fnv1a64,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Straight-alpha glyph colour carried through Parley runs.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone)]
/// Shaped line of text with the measurements anchoring and reveal need.
pub struct PreparedText {
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    /// Total glyphs across all runs.
    pub glyph_count: usize,
    pub width: f64,
    pub height: f64,
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("lines", &self.layout.lines().count())
            .field("glyph_count", &self.glyph_count)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[derive(Clone, Debug)]
/// Parsed path with its arc length cached for reveal trimming.
pub struct PreparedPath {
    pub path: BezPath,
    pub style: PathStyle,
    pub color: Rgba8Premul,
    /// Total arc length in pixels.
    pub length: f64,
}

#[derive(Clone, Debug)]
pub enum PreparedAsset {
    Text(PreparedText),
    Path(PreparedPath),
}

impl PreparedAsset {
    /// Local-space bounds used to resolve clip anchors.
    ///
    /// Text bounds start at the layout origin; stroked paths are grown by half the stroke width.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Text(t) => Rect::new(0.0, 0.0, t.width, t.height),
            Self::Path(p) => {
                let bb = p.path.bounding_box();
                match p.style {
                    PathStyle::Fill => bb,
                    PathStyle::Stroke { width_px } => bb.inflate(width_px / 2.0, width_px / 2.0),
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Content hash of an asset. Assets with equal content share one prepared entry.
pub struct AssetId(pub(crate) u64);

#[derive(Clone, Debug)]
/// Every asset of one composition, shaped and parsed ahead of rendering.
pub struct PreparedAssetStore {
    font: ResolvedFont,
    font_family: Option<String>,
    ids_by_key: HashMap<String, AssetId>,
    assets_by_id: HashMap<AssetId, PreparedAsset>,
}

impl PreparedAssetStore {
    /// Shape all text and parse all paths referenced by `comp`.
    ///
    /// All font IO has already happened in [`crate::resolve_font`]; after this call the render
    /// stages are IO-free. The font is only parsed when the composition has text assets.
    pub fn prepare(comp: &model::Composition, font: ResolvedFont) -> ReelResult<Self> {
        let mut text_engine = if comp
            .assets
            .values()
            .any(|a| matches!(a, model::Asset::Text(_)))
        {
            Some(TextLayoutEngine::new(&font)?)
        } else {
            None
        };
        let mut out = Self {
            font_family: text_engine.as_ref().map(|e| e.family_name().to_string()),
            font,
            ids_by_key: HashMap::new(),
            assets_by_id: HashMap::new(),
        };

        for (key, asset) in &comp.assets {
            let id = Self::hash_id_for(asset);
            if !out.assets_by_id.contains_key(&id) {
                let prepared = prepare_one(asset, text_engine.as_mut())?;
                out.assets_by_id.insert(id, prepared);
            }
            out.ids_by_key.insert(key.clone(), id);
        }

        tracing::debug!(
            assets = comp.assets.len(),
            unique = out.assets_by_id.len(),
            family = out.font_family.as_deref().unwrap_or("-"),
            "prepared assets"
        );
        Ok(out)
    }

    pub fn font(&self) -> &ResolvedFont {
        &self.font
    }

    /// Family name Parley resolved from the font bytes, if any text was shaped.
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    pub fn id_for_key(&self, key: &str) -> ReelResult<AssetId> {
        self.ids_by_key
            .get(key)
            .copied()
            .ok_or_else(|| ReelError::evaluation(format!("unknown asset key '{key}'")))
    }

    pub fn get(&self, id: AssetId) -> ReelResult<&PreparedAsset> {
        self.assets_by_id
            .get(&id)
            .ok_or_else(|| ReelError::evaluation(format!("no prepared asset {:016x}", id.0)))
    }

    fn hash_id_for(asset: &model::Asset) -> AssetId {
        let mut hasher = Fnv1a64::new_default();
        match asset {
            model::Asset::Text(a) => {
                hasher.write_u8(b'T');
                hasher.write(a.text.as_bytes());
                hasher.write_u8(0);
                hasher.write_u32(a.size_px.to_bits());
                hasher.write(&a.color_rgba8);
            }
            model::Asset::Path(a) => {
                hasher.write_u8(b'P');
                hasher.write(a.svg_path_d.as_bytes());
                hasher.write_u8(0);
                match a.style {
                    PathStyle::Fill => hasher.write_u8(0),
                    PathStyle::Stroke { width_px } => {
                        hasher.write_u8(1);
                        hasher.write_f64(width_px);
                    }
                }
                hasher.write(&a.color_rgba8);
            }
        }
        AssetId(hasher.finish())
    }
}

fn prepare_one(
    asset: &model::Asset,
    text_engine: Option<&mut TextLayoutEngine>,
) -> ReelResult<PreparedAsset> {
    match asset {
        model::Asset::Text(a) => {
            let engine = text_engine
                .ok_or_else(|| ReelError::evaluation("text asset without a layout engine"))?;
            let layout = engine.layout_plain(&a.text, a.size_px, a.color_rgba8.into())?;
            Ok(PreparedAsset::Text(PreparedText {
                glyph_count: count_glyphs(&layout),
                width: f64::from(layout.width()),
                height: f64::from(layout.height()),
                layout: Arc::new(layout),
            }))
        }
        model::Asset::Path(a) => {
            let path = parse_svg_path(&a.svg_path_d)?;
            Ok(PreparedAsset::Path(PreparedPath {
                length: path_length(&path),
                path,
                style: a.style,
                color: Rgba8Premul::from_straight(a.color_rgba8),
            }))
        }
    }
}

fn parse_svg_path(d: &str) -> ReelResult<BezPath> {
    match d.trim() {
        "" => Err(ReelError::validation("path data is empty")),
        d => BezPath::from_svg(d)
            .map_err(|e| ReelError::validation(format!("bad path data '{d}': {e}"))),
    }
}

fn count_glyphs(layout: &parley::Layout<TextBrushRgba8>) -> usize {
    let mut glyphs = 0;
    for line in layout.lines() {
        glyphs += line
            .items()
            .map(|item| match item {
                parley::layout::PositionedLayoutItem::GlyphRun(run) => run.glyphs().count(),
                _ => 0,
            })
            .sum::<usize>();
    }
    glyphs
}

/// Parley contexts with exactly one font registered. Also serves as the explainer's
/// [`crate::explainer::mobject::TextMetrics`] so layout and rendering measure alike.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    pub fn new(font: &ResolvedFont) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let (family_id, _) = families.first().ok_or_else(|| {
            ReelError::validation(format!("'{}' holds no usable font family", font.origin))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(*family_id)
            .ok_or_else(|| ReelError::validation(format!("'{}' has no family name", font.origin)))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape and lay out a single unwrapped line of text.
    pub fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !(size_px.is_finite() && size_px > 0.0) {
            return Err(ReelError::validation(format!(
                "text size {size_px} px is not positive"
            )));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout = builder.build(text);
        // No max width: each asset is a single line.
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
