use std::collections::HashMap;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use read_model::ReadModel;
use storage::{
    EntityId, FindCriteria, InMemoryReadModelCache, InMemoryReadModelRepository, ReadModelCache,
    ReadModelRepository,
};

fn customer(name: &str) -> ReadModel {
    ReadModel::new(
        EntityId::new(),
        "customer",
        HashMap::from([
            ("name".to_string(), serde_json::json!(name)),
            ("active".to_string(), serde_json::json!(true)),
        ]),
    )
}

fn bench_repository_save(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let repo = InMemoryReadModelRepository::new();

    c.bench_function("storage/repository_save", |b| {
        b.iter(|| {
            rt.block_on(async {
                repo.save(customer("Ada")).await.unwrap();
            });
        });
    });
}

fn bench_repository_get(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let repo = InMemoryReadModelRepository::new();
    let model = customer("Ada");

    rt.block_on(async {
        repo.save(model.clone()).await.unwrap();
    });

    c.bench_function("storage/repository_get", |b| {
        b.iter(|| {
            rt.block_on(async {
                repo.get("customer", model.id()).await.unwrap();
            });
        });
    });
}

fn bench_repository_find_1000(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let repo = InMemoryReadModelRepository::new();

    rt.block_on(async {
        for i in 0..1000 {
            repo.save(customer(&format!("customer-{i}"))).await.unwrap();
        }
    });

    let criteria = FindCriteria::new()
        .field("active", serde_json::json!(true))
        .limit(50);

    c.bench_function("storage/repository_find_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                repo.find("customer", &criteria).await.unwrap();
            });
        });
    });
}

fn bench_cache_set_get(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = InMemoryReadModelCache::new();
    let model = customer("Ada");

    c.bench_function("storage/cache_set_get", |b| {
        b.iter(|| {
            rt.block_on(async {
                cache.set(&model, Duration::from_secs(60)).await.unwrap();
                cache.get("customer", model.id()).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_repository_save,
    bench_repository_get,
    bench_repository_find_1000,
    bench_cache_set_get,
);
criterion_main!(benches);
