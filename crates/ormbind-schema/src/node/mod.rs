mod class;
mod tag;

pub use class::*;
pub use tag::*;
