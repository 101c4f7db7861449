//! 业务能力层
//!
//! 每个服务只做一件事，由 workflow 层组合。

pub mod answer_service;
pub mod exporter;
pub mod llm_output;
pub mod prompts;
pub mod question_service;

pub use answer_service::AnswerService;
pub use exporter::{ExportFormat, Exporter};
pub use question_service::QuestionService;
