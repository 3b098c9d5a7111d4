#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = consultportal_rust::run().await {
        eprintln!("consultportal-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
