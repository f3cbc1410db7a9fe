use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    mindverse_cli::main_entry().await
}
