//! ocsvm Command Line Interface
//!
//! A command-line interface for training one-class SVM models, scoring
//! new vectors, cross-validating and searching parameters on delimited
//! text data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use ocsvm::api::{OneClassSvm, ParamRange, ParameterGrid};
use ocsvm::kernel::{Kernel, KernelType};
use ocsvm::model::Method;
use ocsvm::persistence::{self, ModelFormat, SerializableModel};
use ocsvm::utils::scaling::{ScalingMethod, ScalingParams};
use ocsvm::{Dataset, Detector, PredictionResult, Result, VectorDataset};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "ocsvm")]
#[command(about = "One-class Support Vector Machines for novelty detection")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model on normal vectors
    Train(TrainArgs),
    /// Score vectors with a trained model
    Predict(PredictArgs),
    /// Display model information
    Info(InfoArgs),
    /// Leave-one-out cross-validation (TPR/TNR)
    Cv(CvArgs),
    /// Search nu and kernel parameters by leave-one-out cross-validation
    GridSearch(GridSearchArgs),
}

#[derive(Args)]
struct DataArgs {
    /// Data file (tab, comma or space delimited)
    #[arg(long)]
    data: PathBuf,

    /// The first column of each line is an id
    #[arg(long)]
    has_id: bool,

    /// Feature scaling method
    #[arg(long)]
    feature_scaling: Option<CliScalingMethod>,
}

#[derive(Args)]
struct ModelArgs {
    /// Model identifier
    #[arg(long, default_value = "ocsvm")]
    id: String,

    /// Training method: scholkopf or tax-and-duin
    #[arg(short, long, default_value = "scholkopf")]
    method: Method,

    /// Regularization parameter nu in (0, 1]
    #[arg(short, long, default_value = "0.1")]
    nu: f64,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.001")]
    tolerance: f64,

    /// Maximum solver iterations
    #[arg(long, default_value = "1000000")]
    max_iterations: usize,

    /// Kernel family: linear, polynomial, gaussian or sigmoid
    #[arg(short, long, default_value = "gaussian")]
    kernel: KernelType,

    /// Kernel parameters, comma separated (family defaults when omitted)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    kernel_params: Vec<f64>,
}

impl ModelArgs {
    fn build(&self) -> Result<OneClassSvm> {
        let params = if self.kernel_params.is_empty() {
            self.kernel.default_params()
        } else {
            self.kernel_params.clone()
        };
        let kernel = Kernel::new(self.kernel, &params)?;

        Ok(OneClassSvm::new()
            .with_id(self.id.clone())
            .with_method(self.method)
            .with_nu(self.nu)
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
            .with_kernel(kernel))
    }
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Model file format
    #[arg(long, default_value = "json")]
    format: ModelFormat,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file (JSON or text record)
    #[arg(long)]
    model: PathBuf,

    #[command(flatten)]
    data: DataArgs,

    /// Base data the scaling parameters are fitted on (defaults to --data)
    #[arg(long)]
    scaling_base: Option<PathBuf>,

    /// Output predictions file (prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct CvArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// Print every held-out prediction
    #[arg(long)]
    show_predictions: bool,
}

#[derive(Args)]
struct GridSearchArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// Range of nu as start,end,step
    #[arg(long, value_parser = parse_range, default_value = "0.1,0.5,0.1")]
    nu_range: ParamRange,

    /// Range of one kernel parameter as start,end,step; repeat once per parameter
    #[arg(long = "param-range", value_parser = parse_range, allow_negative_numbers = true)]
    param_ranges: Vec<ParamRange>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliScalingMethod {
    /// Min-max normalization to [0, 1]
    #[value(name = "minmax")]
    MinMax,
    /// Standard score (z-score) normalization
    #[value(name = "standard")]
    Standardize,
}

impl From<CliScalingMethod> for ScalingMethod {
    fn from(cli_method: CliScalingMethod) -> Self {
        match cli_method {
            CliScalingMethod::MinMax => ScalingMethod::MinMax,
            CliScalingMethod::Standardize => ScalingMethod::Standardize,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Cv(args) => cv_command(args),
        Commands::GridSearch(args) => grid_search_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Load `args.data`, scaled against `base` (or itself) when scaling is requested
fn load_data(args: &DataArgs, base: Option<&Path>) -> Result<VectorDataset> {
    info!("Loading data from: {:?}", args.data);
    let mut dataset = VectorDataset::from_file(&args.data, args.has_id)?;
    info!(
        "Loaded {} vectors with {} dimensions",
        dataset.len(),
        dataset.dim()
    );

    if let Some(method) = args.feature_scaling {
        let params = match base {
            Some(path) => {
                let base = VectorDataset::from_file(path, args.has_id)?;
                ScalingParams::fit(base.vectors(), method.into())
            }
            None => ScalingParams::fit(dataset.vectors(), method.into()),
        };
        info!("Using feature scaling: {method:?}");
        dataset.scale(&params);
    }

    Ok(dataset)
}

fn train_command(args: TrainArgs) -> Result<()> {
    let dataset = load_data(&args.data, None)?;
    let svm = args.model.build()?;
    info!(
        "Training {} model: nu={}, tolerance={}, kernel={}",
        svm.method(),
        svm.nu(),
        svm.config().tolerance,
        svm.kernel()
    );

    let model = svm.train_dataset(&dataset)?;
    info!("Training completed successfully");
    info!(
        "Support vectors: {} of {}",
        model.n_support_vectors(),
        model.len()
    );

    persistence::save_model(&model, &args.output, args.format)?;
    info!("Model saved to: {:?}", args.output);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = persistence::load_model(&args.model)?;

    let dataset = load_data(&args.data, args.scaling_base.as_deref())?;
    let predictions = model.predict_batch(dataset.vectors())?;

    match args.output {
        Some(output_path) => {
            let file = File::create(&output_path)?;
            write_predictions(BufWriter::new(file), &predictions)?;
            info!("Predictions saved to: {output_path:?}");
        }
        None => write_predictions(io::stdout().lock(), &predictions)?,
    }

    Ok(())
}

fn write_predictions<W: Write>(mut writer: W, predictions: &[PredictionResult]) -> Result<()> {
    writeln!(writer, "# Predictions for {} vectors", predictions.len())?;
    writeln!(writer, "# Format: id\ttrue_label\tpredicted_label\tscore")?;
    for prediction in predictions {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.6}",
            prediction.id,
            prediction.true_label.as_deref().unwrap_or("-"),
            prediction.label,
            prediction.score
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = persistence::load_model(&args.model)?;
    let serializable = SerializableModel::from_trained_model(&model);

    print!("{}", serializable.summary());

    println!("\nSupport Vector Details:");
    println!("  Free: {}", model.free_support_vector_indices().len());
    println!("  Dimensions: {}", model.dim());

    println!("\nAlpha values:");
    let alphas = model.alphas();
    let n_show = alphas.len().min(10);
    for (i, alpha) in alphas.iter().enumerate().take(n_show) {
        println!("  α{i} ({}): {alpha:.6}", model.vectors()[i].id);
    }
    if alphas.len() > n_show {
        println!("  ... ({} more)", alphas.len() - n_show);
    }

    Ok(())
}

fn cv_command(args: CvArgs) -> Result<()> {
    let dataset = load_data(&args.data, None)?;
    let svm = args.model.build()?;

    let results = svm.leave_one_out(dataset.vectors())?;
    let metrics = ocsvm::EvaluationMetrics::from_results(&results);

    if args.show_predictions {
        write_predictions(io::stdout().lock(), &results)?;
    }

    println!("=== Leave-one-out Cross-Validation ===");
    println!("Data file: {:?}", args.data.data);
    println!("Method: {}", svm.method());
    println!("Kernel: {}", svm.kernel());
    println!("Nu: {}", svm.nu());
    println!("TPR: {:.4}", metrics.tpr());
    println!("TNR: {:.4}", metrics.tnr());
    println!("Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    Ok(())
}

fn grid_search_command(args: GridSearchArgs) -> Result<()> {
    let dataset = load_data(&args.data, None)?;
    let svm = args.model.build()?;

    let grid = ParameterGrid {
        nu: args.nu_range,
        kernel_params: args.param_ranges,
    };
    let best = svm.grid_search(dataset.vectors(), &grid)?;

    println!("=== Grid Search Results ===");
    println!("Combinations evaluated: {}", best.evaluated);
    println!("Best score (mean of TPR and TNR): {:.2}%", best.score * 100.0);
    println!("Kernel type: {}", best.kernel.kind());
    println!("Nu: {}", best.nu);
    for (i, param) in best.kernel.params().iter().enumerate() {
        println!("Param{}: {param}", i + 1);
    }
    println!("TPR: {:.4}", best.metrics.tpr());
    println!("TNR: {:.4}", best.metrics.tnr());

    Ok(())
}

fn parse_range(s: &str) -> std::result::Result<ParamRange, String> {
    let parts = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| format!("invalid range '{s}': {e}"))?;

    match parts.as_slice() {
        [value] => Ok(ParamRange::fixed(*value)),
        [start, end, step] => Ok(ParamRange::new(*start, *end, *step)),
        _ => Err(format!("expected start,end,step or a single value, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocsvm::{FeatureVector, Label, OcsvmError};

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("0.1,0.5,0.1").unwrap(), ParamRange::new(0.1, 0.5, 0.1));
        assert_eq!(parse_range("2").unwrap(), ParamRange::fixed(2.0));
        assert!(parse_range("1,2").is_err());
        assert!(parse_range("a,b,c").is_err());
    }

    #[test]
    fn test_model_args_defaults() {
        let cli = Cli::parse_from(["ocsvm", "cv", "--data", "x.tsv"]);
        let Commands::Cv(args) = cli.command else {
            panic!("expected cv command");
        };
        let svm = args.model.build().unwrap();
        assert_eq!(svm.method(), Method::Scholkopf);
        assert_eq!(svm.kernel().params(), vec![0.3]);
        assert_eq!(svm.nu(), 0.1);
    }

    #[test]
    fn test_kernel_params_count_checked() {
        let cli = Cli::parse_from([
            "ocsvm", "cv", "--data", "x.tsv", "--kernel", "gaussian", "--kernel-params", "0.5,1.0",
        ]);
        let Commands::Cv(args) = cli.command else {
            panic!("expected cv command");
        };
        assert!(matches!(
            args.model.build(),
            Err(OcsvmError::InvalidKernelParams { .. })
        ));
    }

    #[test]
    fn test_write_predictions() {
        let vector = FeatureVector::new("a", "1", vec![0.0]);
        let predictions = vec![PredictionResult::new(&vector, 0.25, Label::Normal)];
        let mut buffer = Vec::new();
        write_predictions(&mut buffer, &predictions).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("a\t1\t1\t0.250000"));
    }
}
