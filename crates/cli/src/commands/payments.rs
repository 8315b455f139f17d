//! `shopease payments` - membership purchases.

use clap::Subcommand;
use tracing::info;

use shopease_client::ShopClient;
use shopease_core::Email;

use super::{CliError, print_json};

#[derive(Subcommand)]
pub enum PaymentsAction {
    /// Purchase history for a user
    History { email: Email },
}

pub async fn run(client: &ShopClient, action: PaymentsAction) -> Result<(), CliError> {
    match action {
        PaymentsAction::History { email } => {
            let history = client.payment_history(&email).await?;
            info!(count = history.items.len(), "Fetched payment history");
            print_json(&history.items)
        }
    }
}
