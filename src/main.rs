#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pagepilot::cli::run().await
}
