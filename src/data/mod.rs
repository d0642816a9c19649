pub mod cell;
pub mod deep_link;
pub mod density;
pub mod grid;
pub mod selection;
