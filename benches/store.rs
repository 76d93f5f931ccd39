use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sessionkit::session::{FileSessionStore, InMemorySessionStore};
use sessionkit::{SessionId, SessionStore};
use std::sync::Arc;

fn bench_store(c: &mut Criterion, name: &str, store: Arc<dyn SessionStore>, rt: &tokio::runtime::Runtime) {
    let mut group = c.benchmark_group(name);
    let id = SessionId::generate();

    rt.block_on(async {
        for i in 0..16 {
            store
                .set(&id, &format!("key{}", i), "value")
                .await
                .unwrap();
        }
    });

    group.bench_function("set", |b| {
        b.iter(|| {
            rt.block_on(store.set(black_box(&id), "hot", "value")).unwrap();
        });
    });

    group.bench_function("get_all", |b| {
        b.iter(|| {
            let record = rt.block_on(store.get_all(black_box(&id))).unwrap();
            black_box(record);
        });
    });

    group.bench_function("get_all_unknown", |b| {
        let unknown = SessionId::generate();
        b.iter(|| {
            let record = rt.block_on(store.get_all(black_box(&unknown))).unwrap();
            black_box(record);
        });
    });

    group.finish();
}

fn benchmark_memory(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    bench_store(c, "memory_store", Arc::new(InMemorySessionStore::new()), &rt);
}

fn benchmark_file(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = rt
        .block_on(FileSessionStore::new(dir.path()))
        .unwrap();
    bench_store(c, "file_store", Arc::new(store), &rt);
}

criterion_group!(benches, benchmark_memory, benchmark_file);
criterion_main!(benches);
