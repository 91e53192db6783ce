use candlecast::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    candlecast::run(Config::default()).await?;
    Ok(())
}
