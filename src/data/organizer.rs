//! Dataset organizer: sorts raw images into per-label folders.
//!
//! Reads a manifest of `image_name label` lines and places each referenced
//! image from the raw-images directory into `output_dir/label/image_name`.
//! Only a missing manifest or a missing raw-images directory abort the run;
//! every per-entry problem is logged, recorded in the report and skipped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

use crate::data::error::{FileOpError, OrganizeError};
use crate::data::manifest::{parse_manifest, ManifestEntry, ManifestLine};
use crate::data::operations::{copy_file, ensure_dir, move_file, remove_if_exists};
use crate::data::summary::RunSummary;

/// How images are placed into the output tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Copy, leaving the raw image in place. Re-runs reproduce the same tree.
    #[default]
    Copy,
    /// Copy then remove the raw image
    Move,
}

impl TransferMode {
    pub fn as_str(&self) -> &str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub manifest: PathBuf,
    pub raw_images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub transfer: TransferMode,
}

/// Non-fatal condition recorded for a single manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryWarning {
    Malformed {
        line: usize,
        content: String,
    },
    MissingSource {
        line: usize,
        image_name: String,
    },
    TransferFailed {
        line: usize,
        image_name: String,
        reason: String,
    },
    /// The image was listed earlier under another label; the later label wins.
    Relabeled {
        line: usize,
        image_name: String,
        previous_label: String,
        label: String,
    },
}

impl EntryWarning {
    pub fn line(&self) -> usize {
        match self {
            EntryWarning::Malformed { line, .. }
            | EntryWarning::MissingSource { line, .. }
            | EntryWarning::TransferFailed { line, .. }
            | EntryWarning::Relabeled { line, .. } => *line,
        }
    }
}

impl fmt::Display for EntryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryWarning::Malformed { line, content } => {
                write!(f, "line {}: skipping malformed line: {}", line, content)
            }
            EntryWarning::MissingSource { line, image_name } => {
                write!(f, "line {}: image not found: {}", line, image_name)
            }
            EntryWarning::TransferFailed {
                line,
                image_name,
                reason,
            } => write!(f, "line {}: could not place {}: {}", line, image_name, reason),
            EntryWarning::Relabeled {
                line,
                image_name,
                previous_label,
                label,
            } => write!(
                f,
                "line {}: {} relabeled from {} to {}",
                line, image_name, previous_label, label
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    pub summary: RunSummary,
    /// Warnings in manifest order
    pub warnings: Vec<EntryWarning>,
}

/// Run one organizer pass.
///
/// # Returns
/// * `Ok(OrganizeReport)` once every manifest line has been processed
/// * `Err(OrganizeError)` if the inputs are missing, the output root cannot
///   be created, or the manifest cannot be read
pub fn organize(options: &OrganizeOptions) -> Result<OrganizeReport, OrganizeError> {
    let _span = info_span!("organize").entered();

    if !options.manifest.exists() {
        return Err(OrganizeError::ManifestNotFound(options.manifest.clone()));
    }
    if !options.raw_images_dir.exists() {
        return Err(OrganizeError::SourceDirNotFound(
            options.raw_images_dir.clone(),
        ));
    }

    fs::create_dir_all(&options.output_dir).map_err(|source| OrganizeError::OutputDir {
        path: options.output_dir.clone(),
        source,
    })?;

    let content =
        fs::read_to_string(&options.manifest).map_err(|source| OrganizeError::ManifestRead {
            path: options.manifest.clone(),
            source,
        })?;

    info!(
        "Sorting images from {:?} into {:?} ({} mode)",
        options.raw_images_dir,
        options.output_dir,
        options.transfer.as_str()
    );

    let mut organizer = Organizer::new(options);
    for (line, parsed) in parse_manifest(&content) {
        match parsed {
            ManifestLine::Blank => {}
            ManifestLine::Malformed(content) => {
                organizer.report.summary.malformed += 1;
                organizer.record(EntryWarning::Malformed { line, content });
            }
            ManifestLine::Entry(entry) => organizer.place(line, &entry),
        }
    }

    info!("Sorting complete: {}", organizer.report.summary);
    Ok(organizer.report)
}

/// Per-run state. Lives only for one `organize` call.
struct Organizer<'a> {
    options: &'a OrganizeOptions,
    /// Label each image name was placed under during this run
    placed: HashMap<String, String>,
    report: OrganizeReport,
}

impl<'a> Organizer<'a> {
    fn new(options: &'a OrganizeOptions) -> Self {
        Self {
            options,
            placed: HashMap::new(),
            report: OrganizeReport::default(),
        }
    }

    fn record(&mut self, warning: EntryWarning) {
        warn!("{}", warning);
        self.report.warnings.push(warning);
    }

    fn label_path(&self, label: &str, image_name: &str) -> PathBuf {
        self.options.output_dir.join(label).join(image_name)
    }

    fn place(&mut self, line: usize, entry: &ManifestEntry) {
        let label_dir = self.options.output_dir.join(&entry.label);
        if let Err(e) = ensure_dir(&label_dir) {
            self.report.summary.failed += 1;
            self.record(EntryWarning::TransferFailed {
                line,
                image_name: entry.image_name.clone(),
                reason: e.to_string(),
            });
            return;
        }

        let src = self.options.raw_images_dir.join(&entry.image_name);
        let dest = label_dir.join(&entry.image_name);
        let previous_label = self.placed.get(&entry.image_name).cloned();
        let previous_dest = previous_label
            .as_deref()
            .map(|label| self.label_path(label, &entry.image_name));

        // In move mode the raw file is gone after the first placement; the
        // already-placed copy becomes the source.
        let transfer_src = if src.exists() {
            Some(src)
        } else if self.options.transfer == TransferMode::Move {
            previous_dest.clone().filter(|p| p.exists())
        } else {
            None
        };

        let Some(transfer_src) = transfer_src else {
            self.report.summary.missing += 1;
            self.record(EntryWarning::MissingSource {
                line,
                image_name: entry.image_name.clone(),
            });
            return;
        };

        if transfer_src == dest {
            debug!("{} already placed under {}", entry.image_name, entry.label);
            return;
        }

        if let Err(e) = self.transfer(&transfer_src, &dest) {
            self.report.summary.failed += 1;
            self.record(EntryWarning::TransferFailed {
                line,
                image_name: entry.image_name.clone(),
                reason: e.to_string(),
            });
            return;
        }
        debug!("Placed {} under {}", entry.image_name, entry.label);

        self.report.summary.copied += 1;

        if let Some(previous) = previous_label.filter(|l| *l != entry.label) {
            if let Some(previous_dest) = previous_dest {
                if let Err(e) = remove_if_exists(&previous_dest) {
                    warn!("Failed to remove earlier copy {:?}: {}", previous_dest, e);
                }
            }
            self.report.summary.relabeled += 1;
            self.record(EntryWarning::Relabeled {
                line,
                image_name: entry.image_name.clone(),
                previous_label: previous,
                label: entry.label.clone(),
            });
        }
        self.placed
            .insert(entry.image_name.clone(), entry.label.clone());
    }

    fn transfer(&self, src: &Path, dest: &Path) -> Result<(), FileOpError> {
        match self.options.transfer {
            TransferMode::Copy => copy_file(src, dest).map(|_| ()),
            TransferMode::Move => move_file(src, dest),
        }
    }
}
