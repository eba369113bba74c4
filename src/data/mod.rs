//! Data module - file loading, dataset state and column processing

mod dataset;
mod loader;
mod processor;
mod xlsx;

pub use dataset::{Dataset, TablePreview};
pub use loader::{trim_column_names, DataLoader, LoadResult, LoaderError, TableFormat};
pub use processor::{DataProcessor, ProcessorError};
