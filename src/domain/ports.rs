use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// Source of step ids. Ids must be unique within a session.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Source of the `createdAt` stamp on export.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}
