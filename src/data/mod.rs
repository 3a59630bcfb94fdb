//! Loading feature vectors from text files
//!
//! The reader fills a [`VectorDataset`], which implements the
//! [`Dataset`](crate::core::Dataset) trait.

pub mod delimited;

pub use self::delimited::*;
