//! Result type alias for copyperf operations

use crate::Error;

/// Result type alias for copyperf operations
pub type Result<T> = std::result::Result<T, Error>;
