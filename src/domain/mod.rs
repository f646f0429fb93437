pub mod contaminants;
pub mod error;
pub mod types;

pub use contaminants::*;
pub use error::*;
pub use types::*;
