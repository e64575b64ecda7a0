//! Transaction ingestion and daily aggregation.

mod aggregator;
mod dataset;
mod reader;

pub use aggregator::TimeSeriesAggregator;
pub use dataset::{DataSnapshot, SalesDataset};
pub use reader::{parse_day_first, ColumnMapping, TransactionReader};
