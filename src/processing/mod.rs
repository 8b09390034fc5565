pub mod decoder;
pub mod locator;
pub mod merge;
pub mod ocr;
pub mod preprocess;
pub mod visual;

pub use decoder::MrzFieldDecoder;
pub use locator::MrzLineLocator;
pub use merge::FieldMerger;
pub use ocr::{RecognitionClient, TesseractClient};
pub use preprocess::{PreprocessConfig, RasterPreprocessor};
pub use visual::VisualFieldScanner;
