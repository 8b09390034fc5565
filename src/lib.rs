pub mod models;
pub mod pipeline;
pub mod processing;
pub mod utils;

pub use models::{ExtractedFields, MrzLinePair};
pub use pipeline::{extract_fields, DocumentPipeline, PipelineConfig};
pub use processing::{RecognitionClient, TesseractClient};
pub use utils::PassportError;
