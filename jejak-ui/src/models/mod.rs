//! Domain models for the upload-and-compute workflow

pub mod emission;
pub mod line_item;
pub mod upload_session;

pub use emission::{EmissionDetail, EmissionResult};
pub use line_item::{EditableLineItem, NormalizedLineItem, QuantityTable, Unit};
pub use upload_session::{ReceiptFile, SessionError, StateTransition, UploadSession, UploadState};
