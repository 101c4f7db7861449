pub mod chunk;
pub mod dataset;
pub mod loaders;
pub mod question;

pub use chunk::{Chunk, SourceDocument};
pub use dataset::Dataset;
pub use loaders::{load_all_markdown_files, load_markdown_file};
pub use question::{Question, QuestionDraft};
