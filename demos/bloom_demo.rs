//! Fills a filter sized for 100k words and reports how often it is wrong.
//!
//! Run with `RUST_LOG=debug` to see the filter's own events.

use bloom_index::{BloomFilter, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("{}", "=".repeat(60));
    println!("  BLOOM FILTER DEMO");
    println!("  Probabilistic set membership with near-zero memory");
    println!("{}", "=".repeat(60));

    let bf = BloomFilter::new(100_000, 0.01)?;
    println!("\nCreated: {bf}");

    let words: Vec<String> = (0..100_000).map(|i| format!("word_{i}")).collect();
    for word in &words {
        bf.add(word.as_bytes());
    }
    println!("After inserts: {bf}");

    let true_positive = words[..1000]
        .iter()
        .filter(|w| bf.contains(w.as_bytes()))
        .count();
    println!("\nTrue positives  (1000 known words):  {true_positive}/1000");

    let false_positive = (0..10_000)
        .filter(|i| bf.contains(format!("fake_{i}").as_bytes()))
        .count();
    println!(
        "False positives (10000 unknown words): {false_positive}/10000  ({:.2}%)",
        false_positive as f64 / 100.0
    );
    println!(
        "Theoretical FP rate: {:.4}%",
        bf.estimated_false_positive_rate() * 100.0
    );

    let raw_size: usize = words.iter().map(String::len).sum();
    let filter_size = bf.size_in_bytes();
    println!("\nRaw string storage: ~{raw_size} bytes");
    println!("Bloom filter size:   {} bits ({filter_size} bytes)", bf.size());
    println!(
        "Compression ratio:  ~{:.0}x smaller",
        raw_size as f64 / filter_size as f64
    );

    let saved = bf.to_bytes();
    let restored: BloomFilter = BloomFilter::from_bytes(&saved)?;
    println!("\nReloaded {} bytes: {restored}", saved.len());

    Ok(())
}
