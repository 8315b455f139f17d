//! `shopease upcoming` - upcoming products.

use clap::Subcommand;
use tracing::info;

use shopease_client::ShopClient;
use shopease_core::{Email, ProductId};

use super::{CliError, print_json};

#[derive(Subcommand)]
pub enum UpcomingAction {
    /// List upcoming products
    List,
    /// Move an upcoming product into the catalog
    Publish {
        id: String,
        /// Publishing admin
        #[arg(long)]
        admin_email: Email,
    },
}

pub async fn run(client: &ShopClient, action: UpcomingAction) -> Result<(), CliError> {
    match action {
        UpcomingAction::List => {
            let upcoming = client.upcoming_products(None).await?;
            info!(count = upcoming.items.len(), "Fetched upcoming products");
            print_json(&upcoming.items)
        }
        UpcomingAction::Publish { id, admin_email } => {
            let ack = client
                .publish_upcoming_product(&ProductId::new(id), &admin_email)
                .await?;
            info!("Upcoming product published");
            print_json(&ack)
        }
    }
}
