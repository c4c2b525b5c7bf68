mod chain;
mod remote;
mod table;

pub use chain::ChainResolver;
pub use remote::{RemoteResolver, DEFAULT_TIMEOUT};
pub use table::ZipTable;
