use crate::extract::Extractor;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(extractor: &Extractor, path: P, pages: &str, json: bool) -> Result<()> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let result = extractor
        .extract(&bytes, filename, pages)
        .with_context(|| format!("Failed to extract pages from {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for (page, text) in &result.pages {
        println!("--- Page {} ---", page);
        println!("{}", text);
        println!();
    }

    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }

    Ok(())
}
