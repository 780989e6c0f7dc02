use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chatrelay::run().await
}
