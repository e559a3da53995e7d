#![cfg(not(target_arch = "wasm32"))]

use anyhow::Result;
use storage_presign::{Config, Signer, SigningRequest};

pub fn main() -> Result<()> {
    let key = std::env::args().nth(1).unwrap_or_else(|| "index.html".into());

    let signer = Signer::new(Config::from_env()?)?;

    println!("GET: {}", signer.signed_url(&SigningRequest::get(key.as_str()))?);
    println!(
        "PUT: {}",
        signer.signed_url(&SigningRequest::put(key.as_str()).with_content_type("text/html"))?
    );
    println!("DELETE: {}", signer.signed_url(&SigningRequest::delete(key))?);

    Ok(())
}
