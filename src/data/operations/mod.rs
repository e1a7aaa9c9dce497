mod file_ops;

pub use file_ops::{copy_file, ensure_dir, move_file, remove_if_exists};
