pub mod filesystem;

pub use filesystem::{copy_file, copy_into, ensure_directory, list_files, read_json, write_json};
