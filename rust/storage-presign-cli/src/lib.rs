#![cfg(not(target_arch = "wasm32"))]
#![warn(missing_docs)]

//! # Presign
//!
//! Command line access to the site's storage signer. Configuration is read
//! from `STORAGE_*` environment variables once at startup; the presigned URL
//! is written to stdout and logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! presign GET blog/2024/cover.jpg --expires 900
//! presign PUT uploads/avatar.png --content-type image/png --json
//! ```

use anyhow::Result;
use serde::Serialize;
use storage_presign::{Authorization, Clock, Signer};

pub mod cli;

pub use cli::PresignCli;

/// Presign the request described by `cli` and render the output line.
pub fn run<C: Clock>(signer: &Signer<C>, cli: &PresignCli) -> Result<String> {
    let authorization = signer.authorize(&cli.request())?;
    if cli.json {
        Ok(serde_json::to_string_pretty(&Output::from(&authorization))?)
    } else {
        Ok(authorization.url.to_string())
    }
}

#[derive(Serialize)]
struct Output<'a> {
    url: &'a str,
    headers: Vec<Header<'a>>,
    expires_at: String,
}

#[derive(Serialize)]
struct Header<'a> {
    name: &'a str,
    value: &'a str,
}

impl<'a> From<&'a Authorization> for Output<'a> {
    fn from(authorization: &'a Authorization) -> Self {
        Self {
            url: authorization.url.as_str(),
            headers: authorization
                .headers
                .iter()
                .map(|(name, value)| Header { name, value })
                .collect(),
            expires_at: authorization.expires_at.to_rfc3339(),
        }
    }
}
