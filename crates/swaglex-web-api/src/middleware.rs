pub mod compression;
pub mod rate_limit;
pub mod security;

pub use compression::honor_no_compression;
pub use rate_limit::rate_limit_middleware;
pub use security::security_headers;
