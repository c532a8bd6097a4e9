//! Service modules for the upload-and-compute workflow

pub mod calculator_client;
pub mod emission_aggregator;
pub mod image_normalizer;
pub mod persistence_client;
pub mod recognition_client;
pub mod token_store;

pub use calculator_client::{CalculationError, CalculatorClient};
pub use emission_aggregator::{EmissionSummary, Severity};
pub use image_normalizer::{NormalizeError, DEFAULT_JPEG_QUALITY};
pub use persistence_client::{PersistenceClient, PersistError};
pub use recognition_client::{RecognitionClient, RecognitionError};
pub use token_store::TokenStore;
