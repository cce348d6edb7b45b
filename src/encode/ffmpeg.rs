use std::{
    ffi::OsString,
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    foundation::error::{ReelError, ReelResult},
    foundation::math::{mul_div255_u8, mul_div255_u16},
    render::backend::FrameRGBA,
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    /// Integer frames per second.
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    /// yuv420p subsamples chroma 2x2, so both dimensions must be even.
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 || self.fps == 0 {
            return Err(ReelError::validation(format!(
                "mp4 output {}x{} at {} fps must have positive size and rate",
                self.width, self.height, self.fps
            )));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "mp4 output {}x{} must have even width and height",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Command line for a raw RGBA stdin stream in, H.264 yuv420p MP4 out.
    pub fn ffmpeg_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            if self.overwrite { "-y" } else { "-n" },
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push("-s".into());
        args.push(format!("{}x{}", self.width, self.height).into());
        args.push("-r".into());
        args.push(self.fps.to_string().into());
        args.extend(
            [
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create output dir '{}'", dir.display()))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Pipes frames into an `ffmpeg` child process, flattened onto an opaque background.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    background: [u8; 4],
    child: Child,
    /// `None` once the stream has been closed.
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
    frames: u64,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig, background: [u8; 4]) -> ReelResult<Self> {
        cfg.validate()?;
        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(ReelError::validation(format!(
                "refusing to overwrite '{}'",
                cfg.out_path.display()
            )));
        }
        ensure_parent_dir(&cfg.out_path)?;

        let args = cfg.ffmpeg_args();
        tracing::debug!(?args, "spawning ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelError::evaluation(format!("spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::evaluation("ffmpeg stdin was not captured"))?;

        Ok(Self {
            scratch: vec![0; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            background,
            child,
            stdin: Some(stdin),
            frames: 0,
        })
    }

    pub fn encode_frame(&mut self, frame: &FrameRGBA) -> ReelResult<()> {
        if (frame.width, frame.height) != (self.cfg.width, self.cfg.height) {
            return Err(ReelError::validation(format!(
                "frame is {}x{} but the encoder expects {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.background,
        )?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ReelError::evaluation("ffmpeg stream already closed"))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::evaluation(format!("write frame {}: {e}", self.frames)))?;
        self.frames += 1;
        Ok(())
    }

    /// Close the stream and wait for ffmpeg; a non-zero exit carries its stderr.
    pub fn finish(mut self) -> ReelResult<()> {
        self.stdin = None;
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| ReelError::evaluation(format!("wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(ReelError::evaluation(format!(
                "ffmpeg failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::debug!(
            frames = self.frames,
            out = %self.cfg.out_path.display(),
            "ffmpeg finished"
        );
        Ok(())
    }
}

/// Composite RGBA8 `src` over the colour `background` into `dst`, leaving every pixel opaque.
pub fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    background: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src.len() || !src.len().is_multiple_of(4) {
        return Err(ReelError::validation(format!(
            "cannot flatten {} RGBA bytes into {}",
            src.len(),
            dst.len()
        )));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let rest = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                s[c]
            } else {
                mul_div255_u8(u16::from(s[c]), a)
            };
            let bg = mul_div255_u16(u16::from(background[c]), rest);
            d[c] = (u16::from(fg) + bg).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
