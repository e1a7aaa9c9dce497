use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Counters accumulated over one organizer pass.
///
/// `copied` counts every successful transfer, including repeated lines and
/// relabels; `relabeled` counts the subset that moved an image to a new label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub copied: usize,
    pub missing: usize,
    pub malformed: usize,
    pub failed: usize,
    pub relabeled: usize,
}

impl RunSummary {
    /// Console lines printed once the manifest has been consumed.
    /// The missing line is only present when something was missing.
    pub fn report_lines(&self, raw_images_dir: &Path) -> Vec<String> {
        let mut lines = vec![
            "Sorting complete!".to_string(),
            format!("{} images copied into label folders.", self.copied),
        ];
        if self.missing > 0 {
            lines.push(format!(
                "{} images were not found in {}.",
                self.missing,
                raw_images_dir.display()
            ));
        }
        if self.failed > 0 {
            lines.push(format!("{} images could not be transferred.", self.failed));
        }
        lines
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copied={} missing={} malformed={} failed={} relabeled={}",
            self.copied, self.missing, self.malformed, self.failed, self.relabeled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_omits_missing_line_when_zero() {
        let summary = RunSummary {
            copied: 3,
            ..Default::default()
        };
        let lines = summary.report_lines(Path::new("raw"));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "3 images copied into label folders.");
    }

    #[test]
    fn test_report_includes_missing_line() {
        let summary = RunSummary {
            copied: 2,
            missing: 1,
            ..Default::default()
        };
        let lines = summary.report_lines(Path::new("raw"));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1 images were not found in raw.");
    }

    #[test]
    fn test_display() {
        let summary = RunSummary {
            copied: 2,
            missing: 1,
            malformed: 1,
            failed: 0,
            relabeled: 0,
        };
        assert_eq!(
            summary.to_string(),
            "copied=2 missing=1 malformed=1 failed=0 relabeled=0"
        );
    }
}
