use huffpack::{compress_stream, decompress_stream, CodeTable, HuffmanTree};
use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                      The quick brown fox jumps over the lazy dog. \
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.";

    let dir = tempfile::tempdir()?;
    let sample = dir.path().join("sample.txt");
    let packed = dir.path().join("sample.huff");
    let restored = dir.path().join("decompressed.txt");

    std::fs::write(&sample, sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let compressed_size = compress_stream(File::open(&sample)?, File::create(&packed)?)?;
    let compression_ratio = compressed_size as f64 / sample_text.len() as f64;
    println!(
        "Compressed to: {} bytes ({:.1}% of original)",
        compressed_size,
        compression_ratio * 100.0
    );

    if let Some(tree) = HuffmanTree::from_bytes(sample_text.as_bytes()) {
        let codes = CodeTable::from_tree(&tree);
        for (symbol, code) in codes.iter().take(8) {
            println!("  {:?} -> {}", symbol as char, code);
        }
    }

    decompress_stream(File::open(&packed)?, File::create(&restored)?)?;

    let decompressed_text = std::fs::read_to_string(&restored)?;
    if sample_text != decompressed_text {
        return Err("Decompression verification failed".into());
    }
    println!("Decompression successful! Data matches exactly.");

    Ok(())
}
