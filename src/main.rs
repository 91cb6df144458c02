/*
 * Responsibility
 * - Start the tokio runtime
 * - Call app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    casting_agency::app::run().await
}
