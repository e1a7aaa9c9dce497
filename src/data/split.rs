use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::dataset::Dataset;
use crate::data::error::SplitError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSplit {
    pub name: String,
    pub train: usize,
    pub val: usize,
}

/// Train/validation assignment over the whole output tree.
///
/// `train` holds `floor(train_fraction * total)` images chosen by a seeded
/// shuffle of every sample; the remainder goes to `val`.
#[derive(Debug, Clone, Serialize)]
pub struct SplitPlan {
    pub seed: u64,
    pub train_fraction: f64,
    pub classes: Vec<ClassSplit>,
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
}

impl SplitPlan {
    pub fn new(dataset: &Dataset, train_fraction: f64, seed: u64) -> Result<Self, SplitError> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(SplitError::InvalidFraction(train_fraction));
        }

        let mut samples = dataset.samples();
        let total = samples.len();
        let train_size = (train_fraction * total as f64).floor() as usize;

        let mut rng = StdRng::seed_from_u64(seed);
        samples.shuffle(&mut rng);

        let mut classes: Vec<ClassSplit> = dataset
            .classes()
            .iter()
            .map(|c| ClassSplit {
                name: c.name.clone(),
                train: 0,
                val: 0,
            })
            .collect();

        let mut train = Vec::with_capacity(train_size);
        let mut val = Vec::with_capacity(total - train_size);
        for (position, (class_idx, path)) in samples.into_iter().enumerate() {
            if position < train_size {
                classes[class_idx].train += 1;
                train.push(path.to_path_buf());
            } else {
                classes[class_idx].val += 1;
                val.push(path.to_path_buf());
            }
        }

        info!(
            "Split {} images into {} train / {} val (seed {})",
            total,
            train.len(),
            val.len(),
            seed
        );

        Ok(Self {
            seed,
            train_fraction,
            classes,
            train,
            val,
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<(), SplitError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SplitError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Split plan written to {:?}", path);
        Ok(())
    }
}
