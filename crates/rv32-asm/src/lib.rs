pub mod analyze;
pub mod model;

pub use analyze::{analyze, Block, Edge, EdgeKind, Report, Unresolved};
pub use model::{load_program, DataWord, Line, Listing, Symbol};
