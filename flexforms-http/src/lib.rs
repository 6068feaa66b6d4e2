//! HTTP transport for remote form submissions, backed by `reqwest`.
//!
//! ```ignore
//! use flexforms::Form;
//! use flexforms_http::ReqwestTransport;
//!
//! let transport = ReqwestTransport::builder()
//!     .base_url("https://shop.example.com")
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let form = Form::builder(&document).transport(transport).bind()?;
//! ```

mod client;
mod error;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
pub use error::BuildError;
