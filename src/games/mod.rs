//! Game implementations.

pub mod battleship;
