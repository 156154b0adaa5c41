use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

use crate::models::lecture::VideoMetadata;

/// Reads duration, resolution and frame rate of uploaded videos with `ffprobe`.
#[derive(Debug, Clone)]
pub struct MediaProbe {
    ffprobe_path: String,
}

impl MediaProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Never fails: when probing is impossible the upload proceeds with
    /// zeroed metadata and the on-disk size.
    pub async fn extract_metadata(&self, path: &Path) -> VideoMetadata {
        let file_size = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);

        match self.probe(path).await {
            Ok(probed) => VideoMetadata::new(
                probed.duration_seconds,
                probed.width,
                probed.height,
                probed.fps,
                file_size,
            ),
            Err(e) => {
                tracing::warn!("Video metadata extraction failed for {}: {:#}", path.display(), e);
                VideoMetadata::unknown(file_size)
            }
        }
    }

    async fn probe(&self, path: &Path) -> Result<ProbedStream> {
        let output = Command::new(&self.ffprobe_path)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=width,height,r_frame_rate:format=duration")
            .arg("-of")
            .arg("json")
            .arg(path)
            .output()
            .await
            .context("failed to run ffprobe")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffprobe failed: {}", stderr.trim());
        }

        parse_probe_output(&output.stdout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbedStream {
    pub duration_seconds: u64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Parses `ffprobe -of json` output for the first video stream.
pub fn parse_probe_output(stdout: &[u8]) -> Result<ProbedStream> {
    let v: serde_json::Value = serde_json::from_slice(stdout).context("ffprobe output is not JSON")?;

    let stream = &v["streams"][0];
    let width = stream["width"].as_u64().context("no width found")? as u32;
    let height = stream["height"].as_u64().context("no height found")? as u32;
    let fps = stream["r_frame_rate"].as_str().map(parse_frame_rate).unwrap_or(0.0);

    // Whole seconds, truncated
    let duration_seconds = v["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .map(|d| d.max(0.0) as u64)
        .unwrap_or(0);

    Ok(ProbedStream {
        duration_seconds,
        width,
        height,
        fps,
    })
}

/// `30000/1001` style rates; plain numbers are accepted too.
pub fn parse_frame_rate(rate: &str) -> f64 {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().unwrap_or(0.0);
            let den: f64 = den.trim().parse().unwrap_or(0.0);
            if den > 0.0 {
                num / den
            } else {
                0.0
            }
        }
        None => rate.trim().parse().unwrap_or(0.0),
    }
}
