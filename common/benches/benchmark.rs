use common::{
    bits::{minimum_bits, BitReader, BitWriter},
    serde::{GrowableBuffer, Serializer},
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

const FIELDS: usize = 100_000;

fn criterion_benchmark(c: &mut Criterion) {
    let fields = generate_fields();
    let bytes = pack(&fields);

    c.bench_function("Bit Write", |b| b.iter(|| black_box(pack(&fields))));

    c.bench_function("Bit Read", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&bytes);
            for &(_, bits) in &fields {
                black_box(reader.read(bits).unwrap());
            }
        })
    });

    c.bench_function("Growable Cold", |b| {
        b.iter_batched(
            GrowableBuffer::new,
            |mut buffer| {
                black_box(
                    buffer
                        .produce(|ser| ser.write_bytes(&bytes))
                        .unwrap()
                        .len(),
                )
            },
            BatchSize::SmallInput,
        )
    });

    let mut warm = GrowableBuffer::new();
    c.bench_function("Growable Warm", |b| {
        b.iter(|| {
            black_box(
                warm.produce(|ser| ser.write_bytes(&bytes))
                    .unwrap()
                    .len(),
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn generate_fields() -> Vec<(u32, u32)> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..FIELDS)
        .map(|_| {
            let value = rng.gen::<u32>() >> rng.gen_range(0..32_u32);
            (value, minimum_bits(value).max(1))
        })
        .collect()
}

fn pack(fields: &[(u32, u32)]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for &(value, bits) in fields {
        writer.write(value, bits).unwrap();
    }
    writer.finish()
}
