pub mod output;
pub mod plant;
pub mod weather;

pub use output::*;
pub use plant::*;
pub use weather::*;
