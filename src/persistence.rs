//! Model serialization and persistence
//!
//! Trained models can be stored in two formats:
//! - JSON, a serde mirror of [`TrainedModel`] with creation metadata
//! - a flat tab-delimited text record with the whole kernel matrix and the
//!   training vectors written out verbatim
//!
//! Both formats restore a model that scores vectors identically.

use crate::core::{FeatureVector, OcsvmError, Result};
use crate::kernel::{Kernel, KernelType};
use crate::matrix::SymmetricMatrix;
use crate::model::{Method, Threshold, TrainedModel};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// First line of every text model record
pub const TEXT_HEADER: &str = "One-class SVM";

const DELIMITER: char = '\t';

/// On-disk model format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
    Text,
}

impl std::str::FromStr for ModelFormat {
    type Err = OcsvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ModelFormat::Json),
            "text" | "txt" | "tsv" => Ok(ModelFormat::Text),
            other => Err(OcsvmError::InvalidParameter(format!(
                "unknown model format: {other}"
            ))),
        }
    }
}

/// Serializable representation of a trained one-class model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel {
    pub id: String,
    pub method: Method,
    /// Regularization parameter ν
    pub nu: f64,
    pub tolerance: f64,
    /// Kernel family name
    pub kernel_type: String,
    /// Kernel parameters in family order
    pub kernel_params: Vec<f64>,
    pub threshold: Threshold,
    pub alphas: Vec<f64>,
    /// Upper triangle of the kernel matrix, row-major
    pub kernel_matrix: Vec<f64>,
    pub vectors: Vec<FeatureVector>,
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    pub n_training_vectors: usize,
    pub n_support_vectors: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel) -> Self {
        Self {
            id: model.id().to_string(),
            method: model.method(),
            nu: model.nu(),
            tolerance: model.tolerance(),
            kernel_type: model.kernel().kind().name().to_string(),
            kernel_params: model.kernel().params(),
            threshold: model.threshold(),
            alphas: model.alphas().to_vec(),
            kernel_matrix: model.kernel_matrix().packed().to_vec(),
            vectors: model.vectors().to_vec(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_training_vectors: model.len(),
                n_support_vectors: model.support_vector_indices().len(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Rebuild the trained model, validating kernel parameters and shapes
    pub fn to_trained_model(&self) -> Result<TrainedModel> {
        let kind: KernelType = self.kernel_type.parse()?;
        let kernel = Kernel::new(kind, &self.kernel_params)?;
        let kernel_matrix = SymmetricMatrix::from_packed(self.alphas.len(), self.kernel_matrix.clone())?;

        TrainedModel::from_parts(
            self.id.clone(),
            self.method,
            self.nu,
            self.tolerance,
            kernel,
            self.alphas.clone(),
            kernel_matrix,
            self.vectors.clone(),
            self.threshold,
        )
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| OcsvmError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| OcsvmError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Human readable model summary
    pub fn summary(&self) -> String {
        let kernel_params: String = self.kernel_params.iter().map(|p| format!(" {p}")).collect();
        let threshold = match self.threshold {
            Threshold::Rho(rho) => format!("Rho: {rho:.6}"),
            Threshold::SquaredRadius(r2) => format!("Squared radius: {r2:.6}"),
        };

        format!(
            "=== One-class SVM Model Summary ===\n\
             Id: {}\n\
             Method: {}\n\
             Nu: {}\n\
             Tolerance: {}\n\
             Kernel: {}{kernel_params}\n\
             {threshold}\n\
             Training vectors: {}\n\
             Support vectors: {}\n\
             Library version: {}\n\
             Created: {}\n",
            self.id,
            self.method,
            self.nu,
            self.tolerance,
            self.kernel_type,
            self.metadata.n_training_vectors,
            self.metadata.n_support_vectors,
            self.metadata.library_version,
            self.metadata.created_at,
        )
    }
}

/// Write `model` as a tab-delimited text record
pub fn write_text_model<W: Write>(model: &TrainedModel, mut writer: W) -> Result<()> {
    writeln!(writer, "{TEXT_HEADER}")?;
    writeln!(writer, "id{DELIMITER}{}", model.id())?;
    writeln!(writer, "method{DELIMITER}{}", model.method())?;
    writeln!(writer, "regulation param{DELIMITER}{}", model.nu())?;
    writeln!(writer, "tolerance{DELIMITER}{}", model.tolerance())?;

    write!(writer, "kernel{DELIMITER}{}", model.kernel().kind())?;
    for param in model.kernel().params() {
        write!(writer, "{DELIMITER}{param}")?;
    }
    writeln!(writer)?;

    match model.threshold() {
        Threshold::Rho(rho) => writeln!(writer, "rho{DELIMITER}{rho}")?,
        Threshold::SquaredRadius(r2) => writeln!(writer, "squared radius{DELIMITER}{r2}")?,
    }

    writeln!(writer, "alpha vector")?;
    writeln!(writer, "{}", join(model.alphas()))?;

    writeln!(writer, "kernel matrix")?;
    for row in model.kernel_matrix().to_dense() {
        writeln!(writer, "{}", join(&row))?;
    }

    writeln!(writer, "training vectors")?;
    for vector in model.vectors() {
        write!(
            writer,
            "{}{DELIMITER}{}",
            vector.id,
            vector.label.as_deref().unwrap_or("")
        )?;
        for value in &vector.values {
            write!(writer, "{DELIMITER}{value}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a tab-delimited text record written by [`write_text_model`]
pub fn read_text_model<R: BufRead>(reader: R) -> Result<TrainedModel> {
    let mut lines = TextLines {
        inner: reader.lines(),
        line_number: 0,
    };

    if lines.next_line()? != TEXT_HEADER {
        return Err(OcsvmError::ParseError(format!(
            "missing '{TEXT_HEADER}' header"
        )));
    }

    let id = lines.keyed("id")?;
    let method: Method = lines.keyed("method")?.parse()?;
    let nu = parse_f64(&lines.keyed("regulation param")?)?;
    let tolerance = parse_f64(&lines.keyed("tolerance")?)?;

    let kernel_line = lines.keyed("kernel")?;
    let mut kernel_fields = kernel_line.split(DELIMITER);
    let kind: KernelType = kernel_fields.next().unwrap_or_default().parse()?;
    let params = kernel_fields.map(parse_f64).collect::<Result<Vec<_>>>()?;
    let kernel = Kernel::new(kind, &params)?;

    let threshold = match method {
        Method::Scholkopf => Threshold::Rho(parse_f64(&lines.keyed("rho")?)?),
        Method::TaxAndDuin => Threshold::SquaredRadius(parse_f64(&lines.keyed("squared radius")?)?),
    };

    lines.section("alpha vector")?;
    let alphas = parse_row(&lines.next_line()?)?;
    let n = alphas.len();

    lines.section("kernel matrix")?;
    let mut rows = Vec::with_capacity(n);
    for _ in 0..n {
        rows.push(parse_row(&lines.next_line()?)?);
    }
    let kernel_matrix = SymmetricMatrix::new(&rows)?;

    lines.section("training vectors")?;
    let mut vectors = Vec::with_capacity(n);
    for _ in 0..n {
        let line = lines.next_line()?;
        let mut fields = line.split(DELIMITER);
        let id = fields.next().unwrap_or_default().to_string();
        let label = match fields.next() {
            Some("") | None => None,
            Some(label) => Some(label.to_string()),
        };
        let values = fields.map(parse_f64).collect::<Result<Vec<_>>>()?;
        vectors.push(FeatureVector { id, label, values });
    }

    TrainedModel::from_parts(
        id,
        method,
        nu,
        tolerance,
        kernel,
        alphas,
        kernel_matrix,
        vectors,
        threshold,
    )
}

/// Save `model` to `path` in the given format
pub fn save_model<P: AsRef<Path>>(model: &TrainedModel, path: P, format: ModelFormat) -> Result<()> {
    match format {
        ModelFormat::Json => SerializableModel::from_trained_model(model).save_to_file(path),
        ModelFormat::Text => {
            let file = File::create(path)?;
            write_text_model(model, BufWriter::new(file))
        }
    }
}

/// Load a model from `path`, detecting the format from its first line
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mut first_line = String::new();
    reader.read_line(&mut first_line)?;

    if first_line.trim_end() == TEXT_HEADER {
        read_text_model(BufReader::new(File::open(path)?))
    } else {
        SerializableModel::load_from_file(path)?.to_trained_model()
    }
}

struct TextLines<B> {
    inner: std::io::Lines<B>,
    line_number: usize,
}

impl<B: BufRead> TextLines<B> {
    fn next_line(&mut self) -> Result<String> {
        self.line_number += 1;
        match self.inner.next() {
            Some(line) => Ok(line?.trim_end_matches(['\r', '\n']).to_string()),
            None => Err(OcsvmError::ParseError(format!(
                "unexpected end of model record at line {}",
                self.line_number
            ))),
        }
    }

    /// Value of a `key<TAB>value` line
    fn keyed(&mut self, key: &str) -> Result<String> {
        let line = self.next_line()?;
        match line.split_once(DELIMITER) {
            Some((found, value)) if found == key => Ok(value.to_string()),
            _ => Err(OcsvmError::ParseError(format!(
                "line {}: expected '{key}', got '{line}'",
                self.line_number
            ))),
        }
    }

    fn section(&mut self, name: &str) -> Result<()> {
        let line = self.next_line()?;
        if line == name {
            Ok(())
        } else {
            Err(OcsvmError::ParseError(format!(
                "line {}: expected section '{name}', got '{line}'",
                self.line_number
            )))
        }
    }
}

fn parse_f64(field: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| OcsvmError::ParseError(format!("invalid number: {field}")))
}

fn parse_row(line: &str) -> Result<Vec<f64>> {
    line.split(DELIMITER).map(parse_f64).collect()
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}
