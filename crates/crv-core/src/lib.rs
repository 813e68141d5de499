pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{CrvError, Result};
pub use tolerance::Tolerance;
