use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

use super::TrainingError;
use crate::data::dataset::Dataset;

/// Fine-tuning run of the pretrained classifier on the organized output tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierJob {
    pub program: String,
    pub script: PathBuf,
    pub data_dir: PathBuf,
    pub batch_size: u32,
    pub epochs: u32,
    pub num_classes: usize,
    pub train_fraction: f64,
    pub learning_rate: f64,
    pub artifact: PathBuf,
}

impl Default for ClassifierJob {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            script: PathBuf::from("train.py"),
            data_dir: PathBuf::from("classification_dataset/images"),
            batch_size: 32,
            epochs: 5,
            num_classes: 7,
            train_fraction: 0.8,
            learning_rate: 0.001,
            artifact: PathBuf::from("benthic_resnet50.pth"),
        }
    }
}

impl ClassifierJob {
    /// The data directory must be an output tree with exactly `num_classes` label folders.
    pub fn validate(&self) -> Result<Dataset, TrainingError> {
        let dataset = Dataset::open(&self.data_dir)?;
        let found = dataset.classes().len();
        if found != self.num_classes {
            return Err(TrainingError::ClassCount {
                expected: self.num_classes,
                found,
            });
        }
        Ok(dataset)
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.script)
            .arg("--data-dir")
            .arg(&self.data_dir)
            .arg("--batch-size")
            .arg(self.batch_size.to_string())
            .arg("--epochs")
            .arg(self.epochs.to_string())
            .arg("--num-classes")
            .arg(self.num_classes.to_string())
            .arg("--train-fraction")
            .arg(self.train_fraction.to_string())
            .arg("--lr")
            .arg(self.learning_rate.to_string())
            .arg("--output")
            .arg(&self.artifact);
        cmd
    }
}

/// Object-detection training run driven by the detector CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorJob {
    pub program: String,
    /// Annotation config consumed by the detector, unrelated to the output tree
    pub data: PathBuf,
    pub model: String,
    pub epochs: u32,
    pub image_size: u32,
    pub name: String,
}

impl Default for DetectorJob {
    fn default() -> Self {
        Self {
            program: "yolo".to_string(),
            data: PathBuf::from("data.yaml"),
            model: "yolov8s.pt".to_string(),
            epochs: 5,
            image_size: 640,
            name: "benthic_yolov8".to_string(),
        }
    }
}

impl DetectorJob {
    pub fn validate(&self) -> Result<(), TrainingError> {
        if !self.data.is_file() {
            return Err(TrainingError::MissingInput(self.data.clone()));
        }
        Ok(())
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["detect", "train"])
            .arg(format!("data={}", self.data.display()))
            .arg(format!("model={}", self.model))
            .arg(format!("epochs={}", self.epochs))
            .arg(format!("imgsz={}", self.image_size))
            .arg(format!("name={}", self.name));
        cmd
    }
}
