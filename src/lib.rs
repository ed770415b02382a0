//! Popology - tower upgrade resolution for tower-defense simulators

pub mod core;
pub mod tower;
