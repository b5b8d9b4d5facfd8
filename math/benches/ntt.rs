use criterion::{criterion_group, criterion_main, Criterion};
use math::poly::PolyRNS;
use math::ring::RingRNS;
use sampling::source::Source;

fn bench_ntt(c: &mut Criterion) {
    let ring: RingRNS<u64> = RingRNS::<u64>::new(1 << 13, vec![0x7fffffd8001, 0x7fffffc8001]);
    let mut source: Source = Source::new([0u8; 32]);
    let mut a: PolyRNS<u64> = ring.new_polyrns();
    ring.fill_uniform(&mut source, &mut a);

    c.bench_function("ntt/n=8192/levels=2", |b| {
        b.iter(|| ring.ntt_inplace::<false>(&mut a))
    });

    c.bench_function("ntt_lazy/n=8192/levels=2", |b| {
        b.iter(|| ring.ntt_inplace::<true>(&mut a))
    });

    c.bench_function("intt/n=8192/levels=2", |b| {
        b.iter(|| ring.intt_inplace::<false>(&mut a))
    });
}

criterion_group!(benches, bench_ntt);
criterion_main!(benches);
