pub mod markdown_loader;

pub use markdown_loader::{load_all_markdown_files, load_markdown_file};
