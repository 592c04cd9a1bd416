use std::io;

use newsletter_admin::configuration::Settings;
use newsletter_admin::startup::Application;
use newsletter_admin::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
#[allow(clippy::redundant_pub_crate)]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = get_subscriber("newsletter-admin".into(), "info".into(), io::stdout);
    init_subscriber(subscriber);

    // Retrieve settings
    let config = Settings::get_config()?;

    // Serve until the process is stopped
    Application::build(config).await?.run_until_stopped().await?;

    Ok(())
}
