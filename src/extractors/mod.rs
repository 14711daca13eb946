// src/extractors/mod.rs
pub mod metadata;
pub mod section;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use metadata::{ContractMetadata, MetadataExtractor, MetadataField, METADATA_RULES};
#[allow(unused_imports)]
pub use section::{
    ExtractionResult,
    Record,
    RowOutcome,
    SectionScanner,
    UnitSelection,
};
