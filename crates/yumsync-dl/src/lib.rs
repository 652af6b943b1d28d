//! HTTP transport for yumsync.
//!
//! All requests go through one shared [`ureq`] agent ([`http_client::SHARED_AGENT`])
//! whose user agent, proxy, headers and timeout can be adjusted at startup with
//! [`http_client::configure_http_client`]. [`download::Download`] streams a URL
//! into a staged `.part` file and only moves it into place once the transfer
//! completed.

pub mod download;
pub mod error;
pub mod http;
pub mod http_client;
pub mod types;
