// Prints the OpenAPI document served at /docs/openapi.json
// Usage: cargo run --bin openapi_export > openapi.json

use anyhow::{Context, Result};

use api_foundation::api::openapi::{build_openapi, ProjectMetadata};

fn main() -> Result<()> {
    let doc = build_openapi(&ProjectMetadata::current());
    let json = doc
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;
    println!("{}", json);
    Ok(())
}
