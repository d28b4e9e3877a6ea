// Alert lifecycle: active -> resolved -> dismissed.
//
// Architecture:
// - model.rs: Alert record, severity, filter and id types
// - catalog.rs: Monitored sites, generation templates and the seed batch
// - store.rs: Ordered collection, mutations, filtered views and the active-count feed

pub mod catalog;
pub mod model;
pub mod store;

pub use model::{Alert, AlertFilter, AlertId, Severity};
pub use store::AlertStore;
