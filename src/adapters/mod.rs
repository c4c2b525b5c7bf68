// Adapters layer: concrete implementations for external systems (coordinate data, files).

pub mod leads;
pub mod resolver;
pub mod service_areas;
pub mod storage;

pub use leads::{ActionResult, LeadStore};
pub use resolver::{ChainResolver, RemoteResolver, ZipTable};
pub use service_areas::ServiceAreaStore;
pub use storage::LocalStorage;
