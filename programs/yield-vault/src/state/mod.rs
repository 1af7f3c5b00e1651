pub mod keeper;
pub mod queue;
pub mod registry;
pub mod vault;

pub use keeper::*;
pub use queue::*;
pub use registry::*;
pub use vault::*;
