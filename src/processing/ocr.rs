use std::io::Write;

use log::debug;
use tempfile::NamedTempFile;
use tesseract::Tesseract;

use crate::utils::PassportError;

/// Boundary to the external text recognizer. Input is one encoded raster
/// image, output is one opaque text block - no layout, no confidence data.
/// Collaborator failures are wrapped and propagated, never interpreted.
pub trait RecognitionClient {
    fn recognize(&mut self, image_data: &[u8]) -> Result<String, PassportError>;
}

/// Tesseract-backed recognizer with an explicit construct/shutdown
/// lifecycle. The engine handle is owned by the client; there is no
/// lazily-initialized global state.
pub struct TesseractClient {
    engine: Option<Tesseract>,
    languages: String,
}

impl TesseractClient {
    /// Initialize the engine for the given language set, e.g.
    /// `"eng+chi_sim"` for passports carrying both scripts.
    pub fn new(languages: &str) -> Result<Self, PassportError> {
        let engine = Tesseract::new(None, Some(languages))
            .map_err(|e| PassportError::Recognition(format!("Tesseract init error: {}", e)))?;
        Ok(TesseractClient {
            engine: Some(engine),
            languages: languages.to_string(),
        })
    }

    /// Release the engine handle.
    pub fn shutdown(mut self) {
        self.engine.take();
    }

    fn run_recognition(
        engine: Tesseract,
        image_path: &str,
    ) -> Result<(Tesseract, String), PassportError> {
        let mut engine = engine
            .set_image(image_path)
            .map_err(|e| PassportError::Recognition(format!("Tesseract set image error: {}", e)))?;
        let text = engine
            .get_text()
            .map_err(|e| PassportError::Recognition(format!("Tesseract error: {}", e)))?;
        Ok((engine, text))
    }
}

impl RecognitionClient for TesseractClient {
    fn recognize(&mut self, image_data: &[u8]) -> Result<String, PassportError> {
        let mut temp_file = NamedTempFile::new()
            .map_err(|e| PassportError::Io(format!("Failed to create temp file: {}", e)))?;
        temp_file
            .write_all(image_data)
            .map_err(|e| PassportError::Io(format!("Failed to write to temp file: {}", e)))?;
        let image_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| PassportError::Io("Failed to convert path to string".to_string()))?;

        let engine = self.engine.take().ok_or_else(|| {
            PassportError::Recognition(
                "recognition engine unavailable after a failed reinitialization".to_string(),
            )
        })?;

        debug!("Running {} recognition", self.languages);
        match Self::run_recognition(engine, image_path) {
            Ok((engine, text)) => {
                self.engine = Some(engine);
                Ok(text)
            }
            Err(e) => {
                // set_image and get_text consume the handle on failure, so
                // rebuild it: one bad document must not break the batch.
                self.engine = Tesseract::new(None, Some(self.languages.as_str())).ok();
                Err(e)
            }
        }
    }
}
