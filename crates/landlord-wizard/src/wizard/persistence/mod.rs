//! Case facts storage boundary and the debounced save actor.

mod debounce;

pub use debounce::{SaveError, SaveQueue, SaveStatus};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{Jurisdiction, Product};
use super::facts::CaseFacts;

/// Identifier wrapper for a wizard case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata sent alongside every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveContext {
    pub jurisdiction: Jurisdiction,
    pub case_type: &'static str,
    pub product: Product,
}

impl SaveContext {
    pub fn new(product: Product, jurisdiction: Jurisdiction) -> Self {
        Self {
            jurisdiction,
            case_type: product.case_type(),
            product,
        }
    }
}

/// Facts persistence. Saves carry the full facts snapshot, are idempotent and
/// the last write wins.
#[async_trait]
pub trait FactsRepository: Send + Sync {
    async fn get_case_facts(&self, case_id: &CaseId) -> Result<Option<CaseFacts>, RepositoryError>;

    async fn save_case_facts(
        &self,
        case_id: &CaseId,
        facts: &CaseFacts,
        context: SaveContext,
    ) -> Result<(), RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("case {0} not found")]
    NotFound(CaseId),
    #[error("repository rejected the request: {0}")]
    Rejected(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
