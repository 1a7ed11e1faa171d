use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::EntityId;
use criterion::{Criterion, criterion_group, criterion_main};
use event_bus::EventEnvelope;
use projector::{Projection, Projector, Result};
use read_model::ReadModel;
use storage::InMemoryReadModelRepository;

struct CounterProjection;

#[async_trait]
impl Projection for CounterProjection {
    fn name(&self) -> &'static str {
        "CounterProjection"
    }

    fn event_type(&self) -> &'static str {
        "Incremented"
    }

    fn model_type(&self) -> &'static str {
        "counter"
    }

    async fn apply(
        &self,
        event: &EventEnvelope,
        current: Option<&ReadModel>,
    ) -> Result<Option<ReadModel>> {
        Ok(Some(match current {
            Some(model) => {
                let count = model.field("count").and_then(|v| v.as_i64()).unwrap_or(0);
                model.with_field("count", serde_json::json!(count + 1))
            }
            None => ReadModel::new(
                event.entity_id,
                "counter",
                HashMap::from([("count".to_string(), serde_json::json!(1))]),
            ),
        }))
    }
}

fn incremented(entity_id: EntityId) -> EventEnvelope {
    EventEnvelope::builder()
        .event_type("Incremented")
        .entity_id(entity_id)
        .payload_raw(serde_json::json!({}))
        .build()
}

fn bench_apply_new_entities(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut projector = Projector::new(Arc::new(InMemoryReadModelRepository::new()));
    projector.register(Arc::new(CounterProjection));

    c.bench_function("projector/apply_new_entity", |b| {
        b.iter(|| {
            rt.block_on(async {
                projector.apply_event(&incremented(EntityId::new())).await.unwrap();
            });
        });
    });
}

fn bench_apply_1000_events_one_entity(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("projector/apply_1000_events_one_entity", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut projector = Projector::new(Arc::new(InMemoryReadModelRepository::new()));
                projector.register(Arc::new(CounterProjection));

                let entity_id = EntityId::new();
                for _ in 0..1000 {
                    projector.apply_event(&incremented(entity_id)).await.unwrap();
                }
            });
        });
    });
}

fn bench_skip_unregistered_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut projector = Projector::new(Arc::new(InMemoryReadModelRepository::new()));
    projector.register(Arc::new(CounterProjection));

    let event = EventEnvelope::builder()
        .event_type("Unrelated")
        .entity_id(EntityId::new())
        .payload_raw(serde_json::json!({}))
        .build();

    c.bench_function("projector/skip_unregistered_event", |b| {
        b.iter(|| {
            rt.block_on(async {
                projector.apply_event(&event).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_apply_new_entities,
    bench_apply_1000_events_one_entity,
    bench_skip_unregistered_event,
);
criterion_main!(benches);
