//! Delimited text format for feature vectors
//!
//! One vector per line:
//! - `label v1 v2 ...`, or `id label v1 v2 ...` when ids are present
//! - Fields are separated by tabs, falling back to commas, then whitespace
//! - Values may be written as `index:value`; the value part is taken in order
//! - Lines starting with `//` or `#` are comments, blank lines are skipped
//!
//! Vectors without an id column are numbered by their position in the file.

use crate::core::{Dataset, FeatureVector, OcsvmError, Result};
use crate::utils::scaling::ScalingParams;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// In-memory set of feature vectors with a common dimensionality
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDataset {
    vectors: Vec<FeatureVector>,
    dimensions: usize,
}

impl VectorDataset {
    /// Wrap already constructed vectors, checking they share one dimensionality
    pub fn from_vectors(vectors: Vec<FeatureVector>) -> Result<Self> {
        let dimensions = match vectors.first() {
            Some(first) => first.dim(),
            None => return Err(OcsvmError::EmptyDataset),
        };
        if let Some(bad) = vectors.iter().find(|v| v.dim() != dimensions) {
            return Err(OcsvmError::DimensionMismatch {
                expected: dimensions,
                actual: bad.dim(),
            });
        }
        Ok(Self {
            vectors,
            dimensions,
        })
    }

    /// Load a dataset from a file
    pub fn from_file<P: AsRef<Path>>(path: P, has_id: bool) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), has_id)
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R, has_id: bool) -> Result<Self> {
        let mut vectors = Vec::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
                continue;
            }

            let position = vectors.len() + 1;
            let vector = parse_line(line, has_id, position)
                .map_err(|e| OcsvmError::ParseError(format!("line {}: {e}", line_number + 1)))?;
            vectors.push(vector);
        }

        Self::from_vectors(vectors)
    }

    /// Vectors usable for training (unlabeled or labeled normal)
    pub fn targets(&self) -> Vec<FeatureVector> {
        self.vectors.iter().filter(|v| v.is_target()).cloned().collect()
    }

    /// Apply fitted scaling parameters to every vector
    pub fn scale(&mut self, params: &ScalingParams) {
        self.vectors = params.transform_all(&self.vectors);
    }
}

impl Dataset for VectorDataset {
    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }
}

fn split_fields(line: &str, min_fields: usize) -> Vec<&str> {
    let by_tab: Vec<&str> = line.split('\t').map(str::trim).collect();
    if by_tab.len() >= min_fields {
        return by_tab;
    }
    let by_comma: Vec<&str> = line.split(',').map(str::trim).collect();
    if by_comma.len() >= min_fields {
        return by_comma;
    }
    line.split_whitespace().collect()
}

fn parse_line(line: &str, has_id: bool, position: usize) -> std::result::Result<FeatureVector, String> {
    let leading = if has_id { 2 } else { 1 };
    let fields = split_fields(line, leading + 1);
    if fields.len() <= leading {
        return Err(format!("expected at least {} fields, got {}", leading + 1, fields.len()));
    }

    let (id, label) = if has_id {
        (fields[0].to_string(), fields[1])
    } else {
        (position.to_string(), fields[0])
    };

    let values = fields[leading..]
        .iter()
        .map(|field| parse_value(field))
        .collect::<std::result::Result<Vec<f64>, String>>()?;

    Ok(FeatureVector::new(id, label, values))
}

fn parse_value(field: &str) -> std::result::Result<f64, String> {
    let value = match field.split_once(':') {
        Some((_, value)) => value,
        None => field,
    };
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid value: {field}"))
}
