//! Argument parsing for the `presign` binary.

use clap::Parser;
use storage_presign::request::DEFAULT_EXPIRES;
use storage_presign::{Method, SigningError, SigningRequest};

/// Command line arguments for `presign`.
#[derive(Debug, Parser)]
#[command(name = "presign")]
#[command(bin_name = "presign")]
#[command(about = "Issue presigned URLs for objects in the site's storage bucket", long_about = None)]
pub struct PresignCli {
    /// HTTP method the URL grants: GET, PUT or DELETE
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Object key, relative to the bucket root
    pub key: String,

    /// Seconds until the URL expires
    #[arg(short, long, default_value_t = DEFAULT_EXPIRES)]
    pub expires: u64,

    /// Content type the uploader must send (signed as a header)
    #[arg(short, long)]
    pub content_type: Option<String>,

    /// Print the URL, required headers and expiry as JSON
    #[arg(long)]
    pub json: bool,
}

impl PresignCli {
    /// The signing request described by these arguments.
    pub fn request(&self) -> SigningRequest {
        let request = SigningRequest::new(self.method, self.key.clone()).with_expires(self.expires);
        match &self.content_type {
            Some(content_type) => request.with_content_type(content_type.clone()),
            None => request,
        }
    }
}

fn parse_method(value: &str) -> Result<Method, SigningError> {
    value.to_ascii_uppercase().parse()
}
