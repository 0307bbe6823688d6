pub mod classifier;
pub mod endpoints;
pub mod error;
pub mod identity;
pub mod models;
pub mod probe;
pub mod reporting;
pub mod scanner;
pub mod session;
pub mod transport;

// Re-export commonly used items
pub use classifier::*;
pub use endpoints::*;
pub use error::*;
pub use identity::*;
pub use models::*;
pub use probe::*;
pub use reporting::*;
pub use scanner::*;
pub use session::*;
pub use transport::*;
