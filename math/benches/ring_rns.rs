use criterion::{criterion_group, criterion_main, Criterion};
use math::modulus::prime::NTTFriendlyPrimesGenerator;
use math::modulus::{BARRETT, ONCE};
use math::poly::PolyRNS;
use math::ring::impl_u64::basis_extension::BasisExtender;
use math::ring::impl_u64::scaling::ComplexScaler;
use math::ring::RingRNS;
use sampling::source::Source;

fn new_test_rings() -> (RingRNS<u64>, RingRNS<u64>) {
    let n: usize = 1 << 13;
    let mut generator: NTTFriendlyPrimesGenerator<u64> =
        NTTFriendlyPrimesGenerator::<u64>::new(43, (n as u64) << 1);
    let moduli_q: Vec<u64> = (0..3).map(|_| generator.next_downstream_prime()).collect();
    let moduli_p: Vec<u64> = vec![generator.next_downstream_prime()];
    (RingRNS::<u64>::new(n, moduli_q), RingRNS::<u64>::new(n, moduli_p))
}

fn bench_operations(c: &mut Criterion) {
    let (ring, _) = new_test_rings();
    let mut source: Source = Source::new([0u8; 32]);
    let mut a: PolyRNS<u64> = ring.new_polyrns();
    let mut b: PolyRNS<u64> = ring.new_polyrns();
    let mut c_out: PolyRNS<u64> = ring.new_polyrns();
    ring.fill_uniform(&mut source, &mut a);
    ring.fill_uniform(&mut source, &mut b);

    let mut a_mont: PolyRNS<u64> = ring.new_polyrns();
    ring.a_prepare_montgomery_into_b::<ONCE>(&a, &mut a_mont);

    c.bench_function("add/n=8192/levels=3", |bench| {
        bench.iter(|| ring.a_add_b_into_c::<ONCE>(&a, &b, &mut c_out))
    });

    c.bench_function("sub/n=8192/levels=3", |bench| {
        bench.iter(|| ring.a_sub_b_into_c::<1, ONCE>(&a, &b, &mut c_out))
    });

    c.bench_function("mul_montgomery/n=8192/levels=3", |bench| {
        bench.iter(|| ring.a_mul_b_montgomery_into_c::<ONCE>(&a_mont, &b, &mut c_out))
    });

    c.bench_function("mul_montgomery_add/n=8192/levels=3", |bench| {
        bench.iter(|| ring.a_mul_b_montgomery_add_c_into_c::<ONCE>(&a_mont, &b, &mut c_out))
    });

    c.bench_function("mul_barrett/n=8192/levels=3", |bench| {
        bench.iter(|| ring.a_mul_b_into_c::<BARRETT>(&a, &b, &mut c_out))
    });

    c.bench_function("prepare_montgomery/n=8192/levels=3", |bench| {
        bench.iter(|| ring.a_prepare_montgomery_into_b::<ONCE>(&a, &mut a_mont))
    });
}

fn bench_rescaling(c: &mut Criterion) {
    let (ring, _) = new_test_rings();
    let mut source: Source = Source::new([1u8; 32]);
    let mut a: PolyRNS<u64> = ring.new_polyrns();
    let mut buf: PolyRNS<u64> = ring.new_polyrns();
    let mut b: PolyRNS<u64> = ring.new_polyrns();
    ring.fill_uniform(&mut source, &mut a);

    c.bench_function("div_by_last_modulus/n=8192/levels=3", |bench| {
        bench.iter(|| ring.div_by_last_modulus::<true, false>(&a, &mut buf, &mut b))
    });
}

fn bench_basis_extension(c: &mut Criterion) {
    let (ring_q, ring_p) = new_test_rings();
    let ring_qp: RingRNS<u64> = ring_q.merged(&ring_p);
    let mut source: Source = Source::new([2u8; 32]);

    let mut extender: BasisExtender = BasisExtender::new(&ring_q, &ring_p);
    let mut scaler: ComplexScaler = ComplexScaler::new(65537, &ring_q, &ring_p);

    let mut a: PolyRNS<u64> = ring_q.new_polyrns();
    let mut a_qp: PolyRNS<u64> = ring_qp.new_polyrns();
    let mut b: PolyRNS<u64> = ring_q.new_polyrns();
    ring_q.fill_uniform(&mut source, &mut a);

    c.bench_function("extend_basis/n=8192/levels=3+1", |bench| {
        bench.iter(|| extender.extend_basis(&a, &mut a_qp))
    });

    ring_qp.fill_uniform(&mut source, &mut a_qp);

    c.bench_function("complex_scale/n=8192/levels=3+1", |bench| {
        bench.iter(|| scaler.scale(&a_qp, &mut b))
    });
}

criterion_group!(benches, bench_operations, bench_rescaling, bench_basis_extension);
criterion_main!(benches);
