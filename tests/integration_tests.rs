//! Integration tests for the ocsvm library
//!
//! These tests exercise training, prediction and persistence end to end
//! through the public API.

use approx::assert_relative_eq;
use ocsvm::api::{quick, OneClassSvm, ParamRange, ParameterGrid};
use ocsvm::persistence::{load_model, save_model, ModelFormat};
use ocsvm::solver::kkt_gap;
use ocsvm::{
    Dataset, Detector, FeatureVector, Kernel, Label, Method, OcsvmError, OneClassTrainer, VectorDataset,
};
use std::f64::consts::TAU;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// 100 points on four concentric rings of radius 0.02, 0.04, 0.06 and 0.08
fn rings() -> Vec<FeatureVector> {
    let mut vectors = Vec::with_capacity(100);
    for ring in 1..=4 {
        let radius = 0.02 * ring as f64;
        for step in 0..25 {
            let angle = step as f64 * TAU / 25.0;
            vectors.push(FeatureVector::new(
                format!("r{ring}-{step}"),
                "1",
                vec![radius * angle.cos(), radius * angle.sin()],
            ));
        }
    }
    vectors
}

fn cluster(n: usize) -> Vec<FeatureVector> {
    (0..n)
        .map(|i| {
            let angle = i as f64 * TAU / n as f64;
            let radius = 0.5 + 0.1 * (i % 3) as f64;
            FeatureVector::unlabeled(i.to_string(), vec![radius * angle.cos(), radius * angle.sin()])
        })
        .collect()
}

#[test]
fn test_scholkopf_ring_boundary() {
    let model = OneClassSvm::new()
        .with_nu(0.1)
        .with_method(Method::Scholkopf)
        .with_kernel(Kernel::gaussian(0.5).unwrap())
        .train(&rings())
        .expect("Training should succeed");

    let far = FeatureVector::unlabeled("far", vec![5.0, 0.0]);
    let inside = FeatureVector::unlabeled("inside", vec![0.05, 0.0]);

    let far = model.predict(&far).unwrap();
    let inside = model.predict(&inside).unwrap();

    assert!(far.is_outlier(), "distant point scored {}", far.score);
    assert!(far.score < 0.0);
    assert_eq!(inside.label, Label::Normal, "inner point scored {}", inside.score);
}

#[test]
fn test_tax_duin_centroid_and_far_point() {
    let model = OneClassSvm::new()
        .with_nu(0.45)
        .with_method(Method::TaxAndDuin)
        .with_kernel(Kernel::gaussian(1.0).unwrap())
        .train(&cluster(10))
        .expect("Training should succeed");

    assert_relative_eq!(model.alphas().iter().sum::<f64>(), 1.0, epsilon = 1e-9);

    let centroid = model
        .predict(&FeatureVector::unlabeled("c", vec![0.0, 0.0]))
        .unwrap();
    let far = model
        .predict(&FeatureVector::unlabeled("f", vec![10.0, 10.0]))
        .unwrap();

    assert_eq!(centroid.label, Label::Normal, "centroid scored {}", centroid.score);
    assert!(centroid.score <= 0.0);
    assert_eq!(far.label, Label::Outlier, "far point scored {}", far.score);
    assert!(far.score > 0.0);
}

/// 100 points spread over a disc of radius 0.099 around the origin
fn tight_cluster() -> Vec<FeatureVector> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..100)
        .map(|i| {
            let radius = 0.099 * ((i as f64 + 0.5) / 100.0).sqrt();
            let angle = i as f64 * golden_angle;
            FeatureVector::new(
                format!("t{i}"),
                "1",
                vec![radius * angle.cos(), radius * angle.sin()],
            )
        })
        .collect()
}

#[test]
fn test_tax_duin_tight_cluster_radius_ordering() {
    let vectors = tight_cluster();
    let model = OneClassSvm::new()
        .with_nu(0.1)
        .with_method(Method::TaxAndDuin)
        .with_kernel(Kernel::gaussian(0.5).unwrap())
        .train(&vectors)
        .expect("Training should succeed");

    assert!(!model.free_support_vector_indices().is_empty());
    let r2 = model.threshold().value();
    assert!(r2.is_finite());

    let n = vectors.len() as f64;
    let centroid: Vec<f64> = (0..2)
        .map(|d| vectors.iter().map(|v| v.values[d]).sum::<f64>() / n)
        .collect();
    let centroid = model
        .predict(&FeatureVector::unlabeled("centroid", centroid))
        .unwrap();
    let far = model
        .predict(&FeatureVector::unlabeled("far", vec![3.0, 4.0]))
        .unwrap();

    assert!(centroid.score < 0.0, "centroid scored {}", centroid.score);
    assert_eq!(centroid.label, Label::Normal);
    assert!(far.score > 0.0, "far point scored {}", far.score);
    assert_eq!(far.label, Label::Outlier);
}

#[test]
fn test_sigmoid_kernel_trains_both_methods() {
    // tanh saturates near (2, 2), so many pairs have non-positive curvature
    let vectors: Vec<FeatureVector> = (0..30)
        .map(|i| {
            let t = i as f64;
            FeatureVector::unlabeled(i.to_string(), vec![2.0 + 0.2 * t.sin(), 2.0 + 0.2 * (1.3 * t).cos()])
        })
        .collect();
    let kernel = Kernel::sigmoid(1.0, 0.0).unwrap();
    let matrix = kernel.matrix(&vectors).unwrap();
    let non_positive = (0..30)
        .flat_map(|i| (0..30).map(move |t| (i, t)))
        .filter(|&(i, t)| i != t && matrix.get(i, i) + matrix.get(t, t) - 2.0 * matrix.get(i, t) <= 0.0)
        .count();
    assert!(non_positive > 0);

    // nu·n = 16.5 leaves a fractional coefficient for either bound
    let nu = 0.55;
    for method in [Method::Scholkopf, Method::TaxAndDuin] {
        let model = OneClassSvm::new()
            .with_nu(nu)
            .with_method(method)
            .with_max_iterations(100_000)
            .with_kernel(kernel)
            .train(&vectors)
            .unwrap_or_else(|e| panic!("{method} failed: {e}"));

        let c = method.box_bound(nu);
        assert!(model.alphas().iter().all(|&a| a >= -1e-12 && a <= c + 1e-12));
        assert!(model.threshold().value().is_finite());
        let score = model.decision_value(&vectors[0]).unwrap();
        assert!(score.is_finite());
    }
}

#[test]
fn test_coefficients_stay_in_box_and_sum() {
    let vectors = cluster(20);
    for method in [Method::Scholkopf, Method::TaxAndDuin] {
        let nu = 0.33;
        let model = OneClassSvm::new()
            .with_nu(nu)
            .with_method(method)
            .with_kernel(Kernel::gaussian(0.5).unwrap())
            .train(&vectors)
            .unwrap();

        let c = method.box_bound(nu);
        for &alpha in model.alphas() {
            assert!(alpha >= -1e-12 && alpha <= c + 1e-12, "{method}: alpha {alpha} outside [0, {c}]");
        }

        let expected_sum = match method {
            Method::Scholkopf => nu * vectors.len() as f64,
            Method::TaxAndDuin => 1.0,
        };
        assert_relative_eq!(model.alphas().iter().sum::<f64>(), expected_sum, epsilon = 1e-9);
    }
}

#[test]
fn test_optimality_gap_from_recomputed_gradient() {
    let nu = 0.22;
    let tolerance = 0.001;
    let model = OneClassSvm::new()
        .with_nu(nu)
        .with_tolerance(tolerance)
        .with_kernel(Kernel::gaussian(0.4).unwrap())
        .train(&cluster(25))
        .unwrap();

    let vectors = model.vectors();
    let kernel = model.kernel();
    let alphas = model.alphas();
    let gradients: Vec<f64> = vectors
        .iter()
        .map(|vi| {
            vectors
                .iter()
                .zip(alphas)
                .map(|(vj, a)| a * kernel.evaluate(&vi.values, &vj.values))
                .sum()
        })
        .collect();

    let gap = kkt_gap(Method::Scholkopf.box_bound(nu), alphas, &gradients);
    assert!(gap < tolerance + 1e-9, "gap {gap} exceeds tolerance");
}

#[test]
fn test_kernel_matrix_is_symmetric() {
    let model = OneClassSvm::new()
        .with_nu(0.45)
        .with_kernel(Kernel::polynomial(1.0, 2.0).unwrap())
        .train(&cluster(8))
        .unwrap();

    let vectors = model.vectors();
    let matrix = model.kernel_matrix();
    for i in 0..vectors.len() {
        for j in 0..vectors.len() {
            assert_eq!(matrix.get(i, j), matrix.get(j, i));
            assert_relative_eq!(
                matrix.get(i, j),
                model.kernel().evaluate(&vectors[i].values, &vectors[j].values),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn test_duplicate_vectors_terminate() {
    let vectors: Vec<FeatureVector> = (0..10)
        .map(|i| FeatureVector::unlabeled(i.to_string(), vec![0.3, -0.7]))
        .collect();

    let result = OneClassSvm::new()
        .with_nu(0.25)
        .with_kernel(Kernel::linear())
        .train(&vectors);

    match result {
        Ok(model) => {
            let score = model.decision_value(&vectors[0]).unwrap();
            assert!(score.is_finite());
        }
        Err(OcsvmError::DegenerateSupportSet { .. }) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_single_vector_is_insufficient() {
    let result = OneClassSvm::new().train(&[FeatureVector::unlabeled("only", vec![1.0, 2.0])]);
    assert!(matches!(result, Err(OcsvmError::InsufficientTrainingData(1))));
}

#[test]
fn test_reset_then_predict_fails() {
    let mut trainer = OneClassTrainer::new(
        "reset",
        0.45,
        0.001,
        Method::Scholkopf,
        Kernel::gaussian(0.5).unwrap(),
    )
    .unwrap();
    trainer.train(&cluster(6)).unwrap();
    assert!(trainer.predict(&FeatureVector::unlabeled("x", vec![0.0, 0.0])).is_ok());

    trainer.reset();
    assert!(matches!(
        trainer.predict(&FeatureVector::unlabeled("x", vec![0.0, 0.0])),
        Err(OcsvmError::ModelNotTrained)
    ));
}

#[test]
fn test_persistence_round_trip_both_formats() {
    let model = OneClassSvm::new()
        .with_id("roundtrip")
        .with_nu(0.45)
        .with_method(Method::TaxAndDuin)
        .with_kernel(Kernel::gaussian(0.7).unwrap())
        .train(&cluster(12))
        .unwrap();

    let query = FeatureVector::unlabeled("p", vec![0.2, -0.1]);
    let expected = model.decision_value(&query).unwrap();
    let dir = TempDir::new().unwrap();

    for (name, format) in [("model.json", ModelFormat::Json), ("model.txt", ModelFormat::Text)] {
        let path = dir.path().join(name);
        save_model(&model, &path, format).unwrap();
        let loaded = load_model(&path).unwrap();

        assert_eq!(loaded.id(), "roundtrip");
        assert_eq!(loaded.method(), Method::TaxAndDuin);
        assert_eq!(loaded.kernel(), model.kernel());
        assert_eq!(loaded.alphas(), model.alphas());
        assert_relative_eq!(loaded.threshold().value(), model.threshold().value(), epsilon = 1e-12);
        assert_relative_eq!(loaded.decision_value(&query).unwrap(), expected, epsilon = 1e-9);
    }
}

#[test]
fn test_file_workflow_with_outliers() {
    let mut train_file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(train_file, "// id\tlabel\tx\ty").unwrap();
    for (i, v) in cluster(12).iter().enumerate() {
        writeln!(train_file, "n{i}\t1\t{}\t{}", v.values[0], v.values[1]).unwrap();
    }
    writeln!(train_file, "o1\t-1\t8.0\t8.0").unwrap();
    train_file.flush().unwrap();

    let dataset = VectorDataset::from_file(train_file.path(), true).unwrap();
    assert_eq!(dataset.targets().len(), 12);

    let svm = OneClassSvm::new()
        .with_nu(0.3)
        .with_kernel(Kernel::gaussian(0.5).unwrap());
    let model = svm.train_from_file(train_file.path(), true).unwrap();
    assert_eq!(model.len(), 12);

    let predictions = model.predict_batch(dataset.vectors()).unwrap();
    let outlier = predictions.iter().find(|p| p.id == "o1").unwrap();
    assert_eq!(outlier.label, Label::Outlier);
    assert_eq!(outlier.true_label.as_deref(), Some("-1"));
}

#[test]
fn test_quick_train_and_predict() {
    let mut train_file = NamedTempFile::new().unwrap();
    for v in cluster(10) {
        writeln!(train_file, "1,{},{}", v.values[0], v.values[1]).unwrap();
    }
    train_file.flush().unwrap();

    let mut test_file = NamedTempFile::new().unwrap();
    writeln!(test_file, "1,0.0,0.5").unwrap();
    writeln!(test_file, "-1,20.0,20.0").unwrap();
    test_file.flush().unwrap();

    let svm = OneClassSvm::new()
        .with_nu(0.45)
        .with_kernel(Kernel::gaussian(0.5).unwrap());
    let predictions = quick::train_and_predict(train_file.path(), test_file.path(), &svm).unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[1].label, Label::Outlier);

    let model = quick::train_gaussian(train_file.path(), 0.45, 0.5).unwrap();
    assert_eq!(model.method(), Method::Scholkopf);
}

#[test]
fn test_cross_validation_and_grid_search() {
    let mut vectors: Vec<FeatureVector> = cluster(12)
        .into_iter()
        .map(|v| FeatureVector::new(v.id, "1", v.values))
        .collect();
    vectors.push(FeatureVector::new("o1", "-1", vec![6.0, -6.0]));
    vectors.push(FeatureVector::new("o2", "-1", vec![-7.0, 5.0]));

    let svm = OneClassSvm::new().with_kernel(Kernel::gaussian(0.5).unwrap());
    let metrics = svm.clone().with_nu(0.2).cross_validate(&vectors).unwrap();
    assert_eq!(metrics.true_positives + metrics.false_negatives, 12);
    assert_eq!(metrics.true_negatives, 2);

    let grid = ParameterGrid {
        nu: ParamRange::new(0.2, 0.4, 0.1),
        kernel_params: vec![ParamRange::new(0.5, 1.0, 0.5)],
    };
    let best = svm.grid_search(&vectors, &grid).unwrap();
    assert!(best.evaluated > 0 && best.evaluated <= 6);
    assert!(best.score > 0.5);
    assert!(best.nu >= 0.2 - 1e-12 && best.nu <= 0.4 + 1e-12);
}
