use std::fs;

use tempfile::tempdir;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let sample = dir.path().join("sample.txt");
    let compressed = dir.path().join("sample.grin");
    let restored = dir.path().join("restored.txt");

    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                       The quick brown fox jumps over the lazy dog. \
                       Huffman encoding is a greedy algorithm that builds optimal prefix codes.";
    fs::write(&sample, sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let report = grin::encode_file(&sample, &compressed)?;
    println!("Compressed: {}", report);

    let tree = grin::HuffmanTree::from_bytes(sample_text.as_bytes())?;
    let codes = tree.code_table();
    for byte in [b'e', b' ', b'z'] {
        if let Some(code) = codes.get(u16::from(byte)) {
            println!("  {:?} -> {}", byte as char, code);
        }
    }

    let report = grin::decode_file(&compressed, &restored)?;
    println!("Decompressed: {}", report);

    if fs::read_to_string(&restored)? != sample_text {
        return Err("Decompression verification failed".into());
    }
    println!("Round trip matches exactly.");

    Ok(())
}
