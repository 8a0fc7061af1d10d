//! Core data structures and traits for lfsh
//!
//! This crate provides the fundamental types shared by the descriptor
//! pipeline: points, the index-addressable point cloud, the provider and
//! radius search traits, and the error type.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Point3, Vector3};
