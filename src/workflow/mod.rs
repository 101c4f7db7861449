pub mod dataset_flow;
pub mod ingest;
pub mod question_flow;
pub mod task_ctx;

pub use dataset_flow::DatasetFlow;
pub use ingest::{ingest_document, IngestedDocument};
pub use question_flow::QuestionFlow;
pub use task_ctx::TaskCtx;
