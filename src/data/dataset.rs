use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::data::error::DatasetError;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One label folder of the output tree
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFolder {
    pub name: String,
    pub images: Vec<PathBuf>,
}

/// Read-only view over an organized output tree: one folder per label.
///
/// Classes are sorted by name, which is the index order a folder-based
/// image loader assigns to them.
#[derive(Debug, Clone)]
pub struct Dataset {
    classes: Vec<ClassFolder>,
}

impl Dataset {
    pub fn open(root: &Path) -> Result<Self, DatasetError> {
        if !root.is_dir() {
            return Err(DatasetError::NotFound(root.to_path_buf()));
        }

        let entries = fs::read_dir(root).map_err(|source| DatasetError::ReadDir {
            path: root.to_path_buf(),
            source,
        })?;

        let mut classes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let images = list_images(&path);
            classes.push(ClassFolder { name, images });
        }
        classes.sort_by(|a, b| a.name.cmp(&b.name));

        let dataset = Self { classes };
        info!(
            "Found {} classes and {} images in {:?}",
            dataset.classes.len(),
            dataset.total_images(),
            root
        );
        Ok(dataset)
    }

    pub fn classes(&self) -> &[ClassFolder] {
        &self.classes
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn total_images(&self) -> usize {
        self.classes.iter().map(|c| c.images.len()).sum()
    }

    /// All images paired with their class index, in class then file order.
    pub fn samples(&self) -> Vec<(usize, &Path)> {
        self.classes
            .iter()
            .enumerate()
            .flat_map(|(idx, class)| class.images.iter().map(move |p| (idx, p.as_path())))
            .collect()
    }
}

fn list_images(dir: &Path) -> Vec<PathBuf> {
    let mut images = Vec::new();
    match fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && is_image_file(&path) {
                    images.push(path);
                }
            }
        }
        Err(e) => warn!("Failed to read directory {:?}: {}", dir, e),
    }
    // Sort files for consistent ordering
    images.sort();
    images
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_tree(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"x").unwrap();
        }
        temp
    }

    #[test]
    fn test_classes_sorted_by_name() {
        let temp = make_tree(&["star/b.jpg", "crab/a.png", "eel/c.JPEG"]);

        let dataset = Dataset::open(temp.path()).unwrap();

        assert_eq!(dataset.class_names(), vec!["crab", "eel", "star"]);
        assert_eq!(dataset.total_images(), 3);
    }

    #[test]
    fn test_non_images_and_loose_files_ignored() {
        let temp = make_tree(&["crab/a.jpg", "crab/notes.txt", "readme.md"]);

        let dataset = Dataset::open(temp.path()).unwrap();

        assert_eq!(dataset.class_names(), vec!["crab"]);
        assert_eq!(dataset.classes()[0].images.len(), 1);
    }

    #[test]
    fn test_empty_class_is_listed() {
        let temp = make_tree(&["crab/a.jpg"]);
        fs::create_dir_all(temp.path().join("star")).unwrap();

        let dataset = Dataset::open(temp.path()).unwrap();

        assert_eq!(dataset.class_names(), vec!["crab", "star"]);
        assert!(dataset.classes()[1].images.is_empty());
    }

    #[test]
    fn test_samples_carry_class_index() {
        let temp = make_tree(&["crab/a.jpg", "crab/b.jpg", "star/c.jpg"]);

        let dataset = Dataset::open(temp.path()).unwrap();
        let indices: Vec<usize> = dataset.samples().iter().map(|(i, _)| *i).collect();

        assert_eq!(indices, vec![0, 0, 1]);
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = Dataset::open(&temp.path().join("nope"));
        assert!(matches!(result, Err(DatasetError::NotFound(_))));
    }
}
