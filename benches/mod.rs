use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    network::http::bench_get_exchange,
    network::http::bench_chunked_exchange,
    network::http::bench_put_exchange,
    app::bench_telemetry_json
);
criterion_main!(benches);
