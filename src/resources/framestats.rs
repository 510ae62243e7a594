use std::time::{Duration, Instant};

use crate::events::framereport::FrameReport;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Frame and tick counters for the once-per-second [`FrameReport`].
///
/// The reporting window is measured in real time from the last report and
/// does not depend on how many frames or ticks happened in between.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u32,
    ticks: u32,
    total_frames: u64,
    total_seconds: u32,
    last_report: Instant,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            ticks: 0,
            total_frames: 0,
            total_seconds: 0,
            last_report: now,
        }
    }

    pub fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Count a finished render pass. Returns a report when a second or more
    /// has passed since the previous one, and resets the per-second counters.
    pub fn record_frame(&mut self, now: Instant) -> Option<FrameReport> {
        self.frames = self.frames.saturating_add(1);
        if now.saturating_duration_since(self.last_report) < REPORT_INTERVAL {
            return None;
        }

        self.total_frames += u64::from(self.frames);
        self.total_seconds += 1;
        let report = FrameReport {
            frames: self.frames,
            ticks: self.ticks,
            average_frames: (self.total_frames / u64::from(self.total_seconds)) as u32,
            seconds: self.total_seconds,
        };
        self.frames = 0;
        self.ticks = 0;
        self.last_report = now;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_report_before_a_second() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        for i in 1..=30 {
            stats.record_tick();
            assert!(stats.record_frame(start + Duration::from_millis(i * 30)).is_none());
        }
    }

    #[test]
    fn report_counts_and_resets() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        for _ in 0..60 {
            stats.record_tick();
        }
        for _ in 0..99 {
            assert!(stats.record_frame(start + Duration::from_millis(500)).is_none());
        }
        let report = stats.record_frame(start + Duration::from_secs(1)).unwrap();
        assert_eq!(
            report,
            FrameReport {
                frames: 100,
                ticks: 60,
                average_frames: 100,
                seconds: 1,
            }
        );

        stats.record_tick();
        let second = start + Duration::from_secs(1);
        for _ in 0..49 {
            stats.record_frame(second + Duration::from_millis(10));
        }
        let report = stats.record_frame(second + Duration::from_secs(1)).unwrap();
        assert_eq!(report.frames, 50);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.average_frames, 75);
        assert_eq!(report.seconds, 2);
    }

    #[test]
    fn report_line_matches_title_format() {
        let report = FrameReport {
            frames: 118,
            ticks: 60,
            average_frames: 119,
            seconds: 4,
        };
        assert_eq!(report.to_string(), "FPS: 118,   AVG: 119,   TPS: 60,   SEC: 4");
    }
}
