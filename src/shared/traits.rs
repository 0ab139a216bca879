use async_trait::async_trait;
use crate::shared::error::CollectionError;

/// A unit of collection that produces one field of the snapshot.
#[async_trait]
pub trait AsyncDataCollector<T: Send> {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    async fn collect(&self) -> Result<T, CollectionError>;
}

pub trait Validatable {
    fn validate(&self) -> Result<(), String>;
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
