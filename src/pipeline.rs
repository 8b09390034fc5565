use log::{debug, info, warn};

use crate::models::ExtractedFields;
use crate::processing::{
    FieldMerger, MrzFieldDecoder, MrzLineLocator, PreprocessConfig, RasterPreprocessor,
    RecognitionClient, VisualFieldScanner,
};
use crate::utils::PassportError;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    /// The legacy date-of-issue field. Later document batches dropped it,
    /// so it stays off unless a host opts in.
    pub capture_date_of_issue: bool,
}

/// DocumentPipeline orchestrates one document end to end: raw image bytes
/// through preprocessing, the external recognition call, MRZ location and
/// decoding, the visual scan, and the merge. Processing is synchronous and
/// holds no state across documents; only the recognizer handle persists.
pub struct DocumentPipeline<R: RecognitionClient> {
    recognizer: R,
    config: PipelineConfig,
}

impl<R: RecognitionClient> DocumentPipeline<R> {
    pub fn new(recognizer: R, config: PipelineConfig) -> Self {
        DocumentPipeline { recognizer, config }
    }

    /// `raw image -> ExtractedFields`. An unreadable image or a failing
    /// recognizer is an error; anything the recognizer does return, down
    /// to an empty block, yields a fully-shaped (possibly all-empty)
    /// record so callers never branch on partial shapes.
    pub fn run_document(&mut self, raw_image: &[u8]) -> Result<ExtractedFields, PassportError> {
        let conditioned = RasterPreprocessor::process_bytes(raw_image, &self.config.preprocess)?;
        let text = self.recognizer.recognize(&conditioned)?;

        if text.trim().is_empty() {
            warn!("Recognizer returned no text; producing an empty record");
            return Ok(ExtractedFields::default());
        }

        Ok(extract_fields(&text, self.config.capture_date_of_issue))
    }

    /// Hand back the recognizer, e.g. to shut it down explicitly.
    pub fn into_recognizer(self) -> R {
        self.recognizer
    }
}

/// Text-only half of the pipeline: decode the MRZ by fixed offsets when
/// both lines were located, scan the visual zone always, merge MRZ-first.
pub fn extract_fields(text: &str, capture_date_of_issue: bool) -> ExtractedFields {
    let pair = MrzLineLocator::locate(text);
    let visual = VisualFieldScanner::scan(text, capture_date_of_issue);

    match (&pair.line1, &pair.line2) {
        (Some(line1), Some(line2)) => {
            debug!("MRZ lines located; decoding by fixed offsets");
            FieldMerger::merge(&MrzFieldDecoder::decode(line1, line2), &visual)
        }
        _ => {
            info!("MRZ not found; using visual scan only");
            visual
        }
    }
}
