use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ocsvm::{Detector, FeatureVector, Kernel, Method, OneClassSvm};

fn ring(n: usize, dim: usize) -> Vec<FeatureVector> {
    (0..n)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / n as f64;
            let values = (0..dim)
                .map(|d| 0.5 * (angle + d as f64).cos() + 0.01 * (i % 7) as f64)
                .collect();
            FeatureVector::unlabeled(i.to_string(), values)
        })
        .collect()
}

fn bench_kernel_evaluate(c: &mut Criterion) {
    let vectors = ring(2, 64);
    let (x, y) = (&vectors[0].values, &vectors[1].values);
    let kernels = [
        Kernel::linear(),
        Kernel::polynomial(1.0, 3.0).expect("valid parameters"),
        Kernel::gaussian(0.5).expect("valid parameters"),
        Kernel::sigmoid(1.0, 0.0).expect("valid parameters"),
    ];

    let mut group = c.benchmark_group("kernel_evaluate");
    for kernel in &kernels {
        group.bench_with_input(BenchmarkId::from_parameter(kernel.kind()), kernel, |b, kernel| {
            b.iter(|| kernel.evaluate(black_box(x), black_box(y)))
        });
    }
    group.finish();
}

fn bench_kernel_matrix(c: &mut Criterion) {
    let kernel = Kernel::gaussian(0.5).expect("valid parameters");
    let mut group = c.benchmark_group("kernel_matrix");
    for n in [50, 200] {
        let vectors = ring(n, 8);
        group.bench_with_input(BenchmarkId::from_parameter(n), &vectors, |b, vectors| {
            b.iter(|| kernel.matrix(black_box(vectors)))
        });
    }
    group.finish();
}

fn bench_train(c: &mut Criterion) {
    let vectors = ring(200, 4);
    for method in [Method::Scholkopf, Method::TaxAndDuin] {
        let svm = OneClassSvm::new()
            .with_nu(0.15)
            .with_method(method)
            .with_kernel(Kernel::gaussian(0.5).expect("valid parameters"));
        c.bench_function(&format!("train_{method}"), |b| {
            b.iter(|| svm.train(black_box(&vectors)))
        });
    }
}

fn bench_predict(c: &mut Criterion) {
    let vectors = ring(200, 4);
    let model = OneClassSvm::new()
        .with_nu(0.15)
        .with_kernel(Kernel::gaussian(0.5).expect("valid parameters"))
        .train(&vectors)
        .expect("training succeeds");

    c.bench_function("predict_all", |b| {
        b.iter(|| {
            for vector in &vectors {
                let _ = model.predict(black_box(vector));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_kernel_evaluate,
    bench_kernel_matrix,
    bench_train,
    bench_predict
);
criterion_main!(benches);
