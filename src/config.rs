use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::fonts::FontSource,
    encode::ffmpeg::default_mp4_config,
    explainer::script::ExplainerStyle,
    finance::amounts::Scenario,
    foundation::core::{Canvas, Fps},
    foundation::error::{ReelError, ReelResult},
    render::pipeline::RenderThreading,
};

/// Settings for one run, read from JSON.
///
/// Every field is optional in the file; missing fields take the defaults below.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    pub scenario: Scenario,
    pub canvas: Canvas,
    /// Integer frames per second.
    pub fps: u32,
    /// Straight-alpha RGBA8 background.
    pub background_rgba8: [u8; 4],
    /// Font file for all text; `None` picks a system sans-serif face.
    pub font_path: Option<PathBuf>,
    pub out_path: PathBuf,
    pub threading: RenderThreading,
}

impl Default for ReelConfig {
    fn default() -> Self {
        let style = ExplainerStyle::default();
        Self {
            scenario: Scenario::default(),
            canvas: style.canvas,
            fps: style.fps.num,
            background_rgba8: style.background_rgba8,
            font_path: None,
            out_path: PathBuf::from("out/compound_interest.mp4"),
            threading: RenderThreading::default(),
        }
    }
}

impl ReelConfig {
    pub fn load(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    /// Check the scenario and everything the MP4 encoder will insist on later.
    pub fn validate(&self) -> ReelResult<()> {
        self.scenario.validate()?;
        if self.threading.chunk_size == 0 {
            return Err(ReelError::validation("threading.chunk_size must be > 0"));
        }
        if self.threading.threads == Some(0) {
            return Err(ReelError::validation("threading.threads must be > 0"));
        }
        Fps::new(self.fps, 1)?;
        default_mp4_config(&self.out_path, self.canvas.width, self.canvas.height, self.fps)
            .validate()
    }

    pub fn font_source(&self) -> FontSource {
        match &self.font_path {
            Some(p) => FontSource::File(p.clone()),
            None => FontSource::System,
        }
    }

    pub fn style(&self) -> ReelResult<ExplainerStyle> {
        Ok(ExplainerStyle {
            canvas: self.canvas,
            fps: Fps::new(self.fps, 1)?,
            background_rgba8: self.background_rgba8,
            ..ExplainerStyle::default()
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
