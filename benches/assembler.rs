//! Benchmarks for variable assembly and slug normalization.
//!
//! Records are built once through the collector in unattended mode, so the
//! benchmarks measure the assembly itself.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use service_bootstrap::collector::{Collector, CollectorDefaults, CollectorOptions};
use service_bootstrap::config::BootstrapConfig;
use service_bootstrap::gitlab::gitlab_variables;
use service_bootstrap::prompt::NoInputPrompter;
use service_bootstrap::slug::{slugify, PROJECT_SLUG_SEPARATOR};
use service_bootstrap::tfvars::assemble;

/// Builds a record with a domain, redis, monitoring and the given layout.
fn build_config(distribution: &str, deployment_type: &str) -> BootstrapConfig {
    let mut prompter = NoInputPrompter::new(true);
    let options = CollectorOptions {
        output_dir: Some(std::env::temp_dir().join("service-bootstrap-bench")),
        project_name: Some("Acme Shop".to_string()),
        deployment_type: Some(deployment_type.to_string()),
        environment_distribution: Some(distribution.to_string()),
        project_domain: Some("acme.com".to_string()),
        letsencrypt_certificate_email: Some("tech@acme.com".to_string()),
        project_url_monitoring: Some("https://logs.acme.com".to_string()),
        use_redis: Some(true),
        media_storage: Some("digitalocean-s3".to_string()),
        terraform_backend: Some("gitlab".to_string()),
        gitlab_group_slug: Some("acme".to_string()),
        gitlab_private_token: Some("mYV4l1DT0k3N".to_string()),
        ..Default::default()
    };
    Collector::new(&mut prompter, CollectorDefaults::default())
        .collect(options)
        .unwrap()
}

/// Benchmark variable assembly for each stack layout.
fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    for distribution in ["1", "2", "3"] {
        let config = build_config(distribution, "digitalocean-k8s");
        group.bench_function(format!("digitalocean_{}_stacks", distribution), |b| {
            b.iter(|| assemble(black_box(&config)))
        });
    }

    let config = build_config("1", "other-k8s");
    group.bench_function("other_k8s", |b| b.iter(|| assemble(black_box(&config))));

    group.bench_function("to_json", |b| {
        let vars = assemble(&config);
        b.iter(|| black_box(&vars).to_json().unwrap())
    });

    group.finish();
}

/// Benchmark the GitLab variable maps.
fn bench_gitlab_variables(c: &mut Criterion) {
    let config = build_config("3", "digitalocean-k8s");
    c.bench_function("gitlab_variables", |b| {
        b.iter(|| gitlab_variables(black_box(&config)).unwrap())
    });
}

/// Benchmark slug normalization of typical project names.
fn bench_slugify(c: &mut Criterion) {
    let mut group = c.benchmark_group("slugify");

    group.bench_function("ascii", |b| {
        b.iter(|| slugify(black_box("My Project Name"), PROJECT_SLUG_SEPARATOR))
    });

    group.bench_function("diacritics", |b| {
        b.iter(|| slugify(black_box("  Città Nuova Über Straße!! "), PROJECT_SLUG_SEPARATOR))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_assemble,
    bench_gitlab_variables,
    bench_slugify
);
criterion_main!(benches);
