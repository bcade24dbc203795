use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dh_demo::cs::security::{public_key, shared_key, ShiftCipher};
use dh_demo::math::number_theory::{is_prime, is_primitive_root};
use num_bigint::{BigInt, BigUint};

fn bench_primitive_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_primitive_root");
    for &(p, g) in &[(23u64, 5u64), (1009, 11), (7919, 7)] {
        let (p, g) = (BigUint::from(p), BigUint::from(g));
        group.bench_with_input(BenchmarkId::from_parameter(&p), &(p.clone(), g), |b, (p, g)| {
            b.iter(|| is_primitive_root(black_box(g), black_box(p)))
        });
    }
    group.finish();
}

fn bench_is_prime(c: &mut Criterion) {
    let n = BigInt::from(2_147_483_647u64);
    c.bench_function("is_prime 2^31-1", |b| b.iter(|| is_prime(black_box(&n))));
}

fn bench_exchange(c: &mut Criterion) {
    let p = (BigUint::from(1u32) << 127u32) - 1u32;
    let g = BigUint::from(3u32);
    let a = BigInt::parse_bytes(b"123456789012345678901234567890", 10).unwrap();
    let b_secret = BigInt::parse_bytes(b"987654321098765432109876543210", 10).unwrap();

    c.bench_function("exchange 127-bit", |b| {
        b.iter(|| {
            let a_pub = public_key(&g, &a, &p).unwrap();
            let b_pub = public_key(&g, &b_secret, &p).unwrap();
            shared_key(black_box(&b_pub), &a, &p).unwrap() == shared_key(&a_pub, &b_secret, &p).unwrap()
        })
    });
}

fn bench_cipher(c: &mut Criterion) {
    let cipher = ShiftCipher::new(&BigInt::from(2));
    let message: String = (0u8..=255).map(char::from).cycle().take(4096).collect();
    c.bench_function("shift cipher 4k", |b| {
        b.iter(|| cipher.decode(&cipher.encode(black_box(&message))))
    });
}

criterion_group!(
    benches,
    bench_primitive_root,
    bench_is_prime,
    bench_exchange,
    bench_cipher
);
criterion_main!(benches);
