//! services/api/src/bin/openapi.rs
//!
//! Writes the REST API's OpenAPI document to the path given as the first
//! argument (`openapi.json` by default), or to stdout for `-`.

use api_lib::web::rest::ApiDoc;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let document = ApiDoc::to_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        std::fs::write(&target, document)?;
        eprintln!("OpenAPI document written to {}", target);
    }
    Ok(())
}
