use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quad_pipeline::{build_quad_pipeline, BoundedBlockingQueue, WorkFlag};
use std::io;
use std::thread;
use std::time::Duration;

fn benchmark_queue_spsc(c: &mut Criterion) {
    c.bench_function("queue_spsc_10000_items_cap_64", |b| {
        b.iter(|| {
            let queue = BoundedBlockingQueue::with_capacity(64).expect("valid capacity");
            let flag = WorkFlag::new();

            let producer = {
                let queue = queue.clone();
                let flag = flag.clone();
                thread::spawn(move || {
                    for i in 0..10_000u64 {
                        let _ = queue.enqueue(black_box(i), &flag);
                    }
                })
            };

            for _ in 0..10_000 {
                black_box(queue.dequeue(&flag).expect("consumer interrupted"));
            }
            producer.join().expect("producer panicked");
        });
    });
}

fn benchmark_quad_pipeline(c: &mut Criterion) {
    let args: Vec<String> = (0..1000)
        .flat_map(|i| vec![(i % 7 + 1).to_string(), (i % 13).to_string(), "-4".to_string()])
        .collect();

    c.bench_function("quad_pipeline_1000_equations", |b| {
        b.iter(|| {
            let mut quad = build_quad_pipeline(args.clone(), Some(128), io::sink())
                .expect("build failed");
            quad.pipeline.start().expect("start failed");
            quad.pipeline.wait().expect("pipeline failed");
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = benchmark_queue_spsc, benchmark_quad_pipeline
);
criterion_main!(benches);
