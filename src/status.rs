//! Status report assembly: per-resource extractors, the concurrent composer
//! and the response envelope.

pub mod composer;
pub mod envelope;
pub mod extractors;
pub mod types;

pub use composer::{Composition, Extractor, ExtractorFailure, Selectors, StatusComposer};
pub use envelope::{ResponseCode, Status, StatusResponse, build_envelope};
pub use types::{KeyValue, NodeInfo, StatusReport};
