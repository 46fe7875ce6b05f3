// Synonym-aware search over customers and industries.

pub mod consultant_filter;
pub mod handlers;
pub mod lexicon;

pub use lexicon::{LexiconConfig, SearchLexicon};
