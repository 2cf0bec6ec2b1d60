// ============================================================================
// mantle-collections - Core
// Container contracts and the shared error taxonomy
// ============================================================================

pub mod contract;
pub mod error;

pub use contract::{AssocStore, SeqStore, SetStore};
pub use error::CollectionError;
