// src/data.rs
use crate::engine::GestureFeedback;
use crate::navigation::NavigationCommand;
use csv::Writer;
use std::path::{Path, PathBuf};
use std::fs::File;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct TickRecord {
    frame: usize,
    timestamp_ms: u64,
    person_detected: bool,
    right_raised: bool,
    left_raised: bool,
    status: &'static str,
    progress: f64,
    accumulated_ms: u64,
    hand_x: Option<f64>,
    hand_y: Option<f64>,
    fired: Option<&'static str>,
    page_index: usize,
}

impl TickRecord {
    fn new(frame: usize, feedback: &GestureFeedback) -> Self {
        Self {
            frame,
            timestamp_ms: feedback.timestamp_ms,
            person_detected: feedback.person_detected,
            right_raised: feedback.right_raised,
            left_raised: feedback.left_raised,
            status: feedback.status.as_str(),
            progress: feedback.progress,
            accumulated_ms: feedback.accumulated_ms,
            hand_x: feedback.hand_position.map(|p| p.x),
            hand_y: feedback.hand_position.map(|p| p.y),
            fired: feedback.fired.map(|c| c.as_str()),
            page_index: feedback.current_index,
        }
    }
}

/// Collects per-tick feedback from one gesture session and writes it out.
pub struct SessionRecorder {
    output_dir: PathBuf,
    session_id: Uuid,
    session_name: String,
    section_titles: Vec<String>,
    ticks: Vec<GestureFeedback>,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>, section_titles: Vec<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_id: Uuid::new_v4(),
            session_name,
            section_titles,
            ticks: Vec::new(),
        }
    }

    pub fn add_tick(&mut self, feedback: &GestureFeedback) {
        self.ticks.push(feedback.clone());
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("ticks.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("creating {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);

        for (i, feedback) in self.ticks.iter().enumerate() {
            writer.serialize(TickRecord::new(i, feedback))?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    pub fn generate_report(&self) -> Result<PathBuf> {
        let report_path = self.session_dir().join("report.html");

        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        std::fs::write(&report_path, self.create_html_report())
            .with_context(|| format!("writing {}", report_path.display()))?;

        Ok(report_path)
    }

    fn create_html_report(&self) -> String {
        let total_frames = self.ticks.len();
        let detected = self.ticks.iter().filter(|t| t.person_detected).count();
        let advances = self.count_fired(NavigationCommand::Advance);
        let retreats = self.count_fired(NavigationCommand::Retreat);
        let detection_rate = if total_frames == 0 {
            0.0
        } else {
            detected as f64 / total_frames as f64 * 100.0
        };
        let final_section = self
            .ticks
            .last()
            .and_then(|t| self.section_titles.get(t.current_index))
            .map(String::as_str)
            .unwrap_or("-");

        format!(r#"
<!DOCTYPE html>
<html>
<head>
    <title>Gesture Session Report - {}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #6366F1; font-size: 1.2em; }}
    </style>
</head>
<body>
    <h1>Gesture Navigation Session Report</h1>
    <div class="stats">
        <h2>Session: {}</h2>
        <div class="stat-item">
            <span class="stat-label">Session ID:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Total Frames:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Person Detected:</span>
            <span class="stat-value">{:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Advances:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Retreats:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Final Section:</span>
            <span class="stat-value">{}</span>
        </div>
    </div>
</body>
</html>
        "#,
            self.session_name,
            self.session_name,
            self.session_id,
            total_frames,
            detection_rate,
            advances,
            retreats,
            final_section
        )
    }

    fn count_fired(&self, command: NavigationCommand) -> usize {
        self.ticks.iter().filter(|t| t.fired == Some(command)).count()
    }
}
