pub mod api;
pub mod collector;
pub mod context;
pub mod describer;
pub mod errors;
pub mod extract;
pub mod filter;
pub mod model;
pub mod regions;
pub mod registry;
pub mod rules;

pub use api::StructuralPerceiver;
pub use context::ContextAssembler;
pub use describer::{describe, snapshot, to_compact};
pub use errors::{PerceiverError, PerceiverResult, RegistryError};
pub use extract::{
    extract_cards, extract_forms, extract_lists, extract_tables, page_metadata, page_summary,
    ExtractedCard, ExtractedField, ExtractedForm, ExtractedList, ExtractedTable, PageMetadata,
    PageSummary,
};
pub use filter::{extract_keywords, rank, score_elements};
pub use model::{ElementCategory, ScoredElement, ViewportClass};
pub use registry::{CollectedElement, ElementRegistry};
