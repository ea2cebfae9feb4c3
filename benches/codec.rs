use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use huffpack::{compress, decompress, FrequencyTable, HuffmanTree};

fn generate_test_data(size: usize, entropy_level: f64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);

    if entropy_level < 1.0 {
        // Low entropy - mostly one byte
        for i in 0..size {
            data.push(if i % 17 == 0 { b'b' } else { b'a' });
        }
    } else if entropy_level < 4.0 {
        // Medium entropy - short repeating pattern
        let pattern_size = (8.0 / entropy_level) as usize;
        let pattern: Vec<u8> = (0..pattern_size).map(|i| i as u8).collect();
        for i in 0..size {
            data.push(pattern[i % pattern.len()]);
        }
    } else {
        // High entropy - hashed positions
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        for i in 0..size {
            let mut hasher = DefaultHasher::new();
            i.hash(&mut hasher);
            data.push((hasher.finish() % 256) as u8);
        }
    }

    data
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_codec");

    for &size in &[1024, 65536, 1 << 20] {
        for &entropy in &[0.5, 2.0, 6.0] {
            let data = generate_test_data(size, entropy);
            let packed = compress(&data);
            let label = format!("{size}_{entropy}");

            group.bench_with_input(BenchmarkId::new("compress", &label), &data, |b, data| {
                b.iter(|| black_box(compress(data)));
            });
            group.bench_with_input(BenchmarkId::new("decompress", &label), &packed, |b, packed| {
                b.iter(|| black_box(decompress(packed).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_tree_build(c: &mut Criterion) {
    let data = generate_test_data(1 << 16, 6.0);
    let frequencies = FrequencyTable::from_bytes(&data);
    c.bench_function("tree_build_256_symbols", |b| {
        b.iter(|| black_box(HuffmanTree::from_frequencies(&frequencies)));
    });
}

criterion_group!(benches, bench_codec, bench_tree_build);
criterion_main!(benches);
