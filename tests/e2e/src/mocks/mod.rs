mod failing_store;
mod fixtures;

pub use failing_store::FailingStore;
pub use fixtures::TestDataFactory;
