pub mod config;
pub mod geometry;
pub mod grid_world;
pub mod noise;
pub mod simple_golf;
