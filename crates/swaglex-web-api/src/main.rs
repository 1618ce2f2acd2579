#[cfg(feature = "use_mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use miette::IntoDiagnostic;
use swaglex_web_api::{
    Config,
    server::{init_tracing, start_server},
};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = Config::from_env();
    init_tracing(&config);
    start_server(config).await.into_diagnostic()
}
