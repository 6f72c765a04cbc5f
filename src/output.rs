use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Render a version list for human output; `-` when empty.
pub fn version_list(versions: &[String]) -> String {
    if versions.is_empty() {
        "-".to_string()
    } else {
        versions.join(" -> ")
    }
}
