//! Interfaces to the collaborators that sit outside the calibration core.

pub mod classifier_head;
pub mod collective;
pub mod feature_extractor;
pub mod taxonomy_source;

pub use classifier_head::ClassifierHead;
pub use collective::Collective;
pub use feature_extractor::{ExtractorOutput, FeatureExtractor};
pub use taxonomy_source::TaxonomySource;
