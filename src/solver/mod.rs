//! Quadratic programming solver for the one-class dual problem
//!
//! This module implements the decomposition method with the WSS3 working
//! set selection described in "Working Set Selection Using Second Order
//! Information for Training Support Vector Machines" by Fan, Chen and Lin.

pub mod wss3;

pub use self::wss3::*;
