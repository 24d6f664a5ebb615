//! Append-only frame report log.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pinchzoom_common::error::{PinchzoomError, PinchzoomResult};

use crate::render_loop::FrameReport;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// First line of a report file, written as `# {json}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub schema_version: String,
    /// Wall-clock time the stream started (RFC 3339).
    pub epoch_wall: String,
    pub display_width: u32,
    pub display_height: u32,
}

impl ReportHeader {
    pub fn new(epoch_wall: impl Into<String>, display_width: u32, display_height: u32) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            epoch_wall: epoch_wall.into(),
            display_width,
            display_height,
        }
    }
}

/// Writes one [`FrameReport`] per line to a JSONL file.
pub struct FrameReportWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    reports_written: u64,
}

impl FrameReportWriter {
    /// Create the file (truncating any previous one) and write the header.
    pub fn new(path: PathBuf, header: &ReportHeader) -> PinchzoomResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| PinchzoomError::render(format!("Failed to write report header: {e}")))?;

        Ok(Self {
            writer,
            path,
            reports_written: 0,
        })
    }

    pub fn write_report(&mut self, report: &FrameReport) -> PinchzoomResult<()> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| PinchzoomError::render(format!("Failed to write frame report: {e}")))?;
        self.reports_written += 1;

        // About five seconds of frames at 60 Hz.
        if self.reports_written % 300 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> PinchzoomResult<()> {
        self.writer
            .flush()
            .map_err(|e| PinchzoomError::render(format!("Failed to flush frame reports: {e}")))
    }

    pub fn reports_written(&self) -> u64 {
        self.reports_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FrameReportWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use pinchzoom_hand_model::viewport::CropRect;

    use super::*;

    #[test]
    fn test_report_writer_lines() {
        let dir = std::env::temp_dir().join("pinchzoom_test_report_writer");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("frames.jsonl");
        let header = ReportHeader::new("2026-01-01T00:00:00Z", 640, 480);

        {
            let mut writer = FrameReportWriter::new(path.clone(), &header).unwrap();
            for i in 0..3u64 {
                writer
                    .write_report(&FrameReport {
                        frame_index: i,
                        timestamp_ns: i * 16_666_667,
                        zoom: 1.0 + i as f64 * 0.5,
                        crop: CropRect::centered(640.0, 480.0, 1.0 + i as f64 * 0.5),
                        hand_detected: i > 0,
                        pinch_distance_px: (i > 0).then_some(100.0 + i as f64 * 50.0),
                    })
                    .unwrap();
            }
            assert_eq!(writer.reports_written(), 3);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);

        let parsed: ReportHeader =
            serde_json::from_str(lines[0].strip_prefix("# ").unwrap()).unwrap();
        assert_eq!(parsed, header);

        let first: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["hand_detected"], false);
        assert!(first.get("pinch_distance_px").is_none());

        let last: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(last["zoom"], 2.0);
        assert_eq!(last["crop"]["width"], 320.0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
