use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use rust_embed::Embed;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::bank::catalog::{CATALOG_FILE, CatalogError, ExamCatalog};
use crate::bank::question::{HandwritingQuestion, Question};

#[derive(Embed)]
#[folder = "assets/banks/"]
struct BankAssets;

#[derive(Debug, Error)]
pub enum BankLoadError {
    #[error("question bank {file} not found")]
    Missing { file: String },
    #[error("failed to read question bank {file}: {source}")]
    Io { file: String, source: io::Error },
    #[error("question bank {file} is not valid: {source}")]
    Parse {
        file: String,
        source: serde_json::Error,
    },
}

/// Loads question banks by resource name and keeps them for the lifetime of
/// the process. A configured directory is consulted first, then the banks
/// bundled into the binary.
pub struct BankLibrary {
    dir: Option<PathBuf>,
    questions: HashMap<String, Rc<Vec<Question>>>,
    handwriting: HashMap<String, Rc<Vec<HandwritingQuestion>>>,
}

impl BankLibrary {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            questions: HashMap::new(),
            handwriting: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> Result<ExamCatalog, CatalogError> {
        let content = self
            .read_resource(CATALOG_FILE)
            .map_err(|_| CatalogError::Missing(CATALOG_FILE.to_string()))?;
        ExamCatalog::parse(&content)
    }

    pub fn questions(&mut self, file: &str) -> Result<Rc<Vec<Question>>, BankLoadError> {
        if let Some(bank) = self.questions.get(file) {
            return Ok(Rc::clone(bank));
        }
        let bank: Rc<Vec<Question>> = Rc::new(self.parse_bank(file)?);
        self.questions.insert(file.to_string(), Rc::clone(&bank));
        Ok(bank)
    }

    pub fn handwriting(
        &mut self,
        file: &str,
    ) -> Result<Rc<Vec<HandwritingQuestion>>, BankLoadError> {
        if let Some(bank) = self.handwriting.get(file) {
            return Ok(Rc::clone(bank));
        }
        let bank: Rc<Vec<HandwritingQuestion>> = Rc::new(self.parse_bank(file)?);
        self.handwriting.insert(file.to_string(), Rc::clone(&bank));
        Ok(bank)
    }

    fn parse_bank<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, BankLoadError> {
        let content = self.read_resource(file)?;
        let records: Vec<T> =
            serde_json::from_str(&content).map_err(|source| BankLoadError::Parse {
                file: file.to_string(),
                source,
            })?;
        debug!(file, count = records.len(), "loaded question bank");
        Ok(records)
    }

    fn read_resource(&self, file: &str) -> Result<String, BankLoadError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(file);
            if path.exists() {
                return fs::read_to_string(&path).map_err(|source| BankLoadError::Io {
                    file: file.to_string(),
                    source,
                });
            }
        }

        let Some(asset) = BankAssets::get(file) else {
            warn!(file, "question bank resource not found");
            return Err(BankLoadError::Missing {
                file: file.to_string(),
            });
        };
        String::from_utf8(asset.data.into_owned()).map_err(|e| BankLoadError::Io {
            file: file.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })
    }
}
