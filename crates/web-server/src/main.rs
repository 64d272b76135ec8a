use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// The root `tradebook serve` command does the same with more options.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config(Path::new("tradebook.toml"))?;
    let _guard = configuration::init_tracing(&config.logging)?;
    web_server::run_server(&config).await
}
