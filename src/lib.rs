pub mod alerts;
pub mod constants;
pub mod env_state;
pub mod query;
pub mod skystream_errors;
pub mod stream;
pub mod time;
pub mod token_cache;

pub use alerts::features::{
    extract_features, extract_features_with, FeatureRecord, FeatureTable, MeanField,
};
pub use alerts::merge::merge_alerts;
pub use alerts::{Alert, Candidate, FilterBand, MergedAlert};
pub use constants::AlertBatch;
pub use query::ArchiveQuery;
pub use skystream_errors::SkystreamError;
pub use stream::{AlertSource, RetryPolicy, Skystream};
