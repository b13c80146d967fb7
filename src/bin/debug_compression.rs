use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_compressor::{package, trigger, BatchProcessor, BatchState, InputFile};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("🗜️  Compression Debug Tool");
    println!("=========================");

    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("Usage: debug_compression <file> [<file> ...]");
        std::process::exit(1);
    }

    let mut files = Vec::new();
    for path in &paths {
        match InputFile::from_path(path) {
            Ok(file) => {
                println!("📄 {} ({} bytes, {})", file.name, file.size(), file.mime_type);
                files.push(file);
            }
            Err(e) => eprintln!("❌ {}: {}", path.display(), e),
        }
    }

    let state = Arc::new(BatchState::new());
    let processor = BatchProcessor::new(state.clone());
    let results = processor.process_batch(files).await;

    if let Some(report) = state.report() {
        println!("\n📊 Batch report:");
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match trigger(package(&results)?, Path::new("."))? {
        Some(saved) => println!("\n✅ Saved {}", saved.display()),
        None => println!("\nNothing could be reduced; no download produced."),
    }

    Ok(())
}
