//! Utility modules for the school statistics engine
//!
//! Contains shared functionality used by the repository and the aggregates:
//! - Transliteration: Serbian Latin → Cyrillic and search variants
//! - Rounding: half-up rounding applied at the presentation boundary

pub mod transliteration;
pub mod rounding;

// Re-export commonly used types
pub use transliteration::{to_cyrillic, expand_search_variants, NameMatcher, SearchVariants};
pub use rounding::{round_to, round1, round2, round2_opt};
