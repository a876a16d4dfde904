use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    nodefinder_cli::main_entry().await
}
