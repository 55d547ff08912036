//! Operating system backed implementations of the scanner's collaborators.

mod process;
mod resolver;

pub use process::TokioProcessRunner;
pub use resolver::SystemResolver;
