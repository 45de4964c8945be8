pub mod model;

pub use model::SelectionState;
