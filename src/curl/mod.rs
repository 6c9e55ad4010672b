mod fetch;
mod model;
mod rules;

pub use fetch::{curl_to_fetch_options, extract_endpoint};
pub use model::{FetchOptions, ParsedCurl};
pub use rules::parse_curl;
