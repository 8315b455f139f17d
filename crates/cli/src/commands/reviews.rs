//! `shopease reviews` - review moderation.

use clap::Subcommand;
use tracing::info;

use shopease_client::ShopClient;
use shopease_core::{ProductId, ReviewId};

use super::{CliError, PageArgs, print_json};

#[derive(Subcommand)]
pub enum ReviewsAction {
    /// Every review, newest first
    All {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Reviews of one product
    ForProduct { product_id: String },
    /// Delete a review
    Delete { id: String },
}

pub async fn run(client: &ShopClient, action: ReviewsAction) -> Result<(), CliError> {
    match action {
        ReviewsAction::All { page } => {
            let reviews = client.all_reviews(page.request()?).await?;
            info!(
                count = reviews.items.len(),
                pages = reviews.total_pages(),
                "Fetched reviews"
            );
            print_json(&reviews)
        }
        ReviewsAction::ForProduct { product_id } => {
            let reviews = client.product_reviews(&ProductId::new(product_id)).await?;
            print_json(&reviews.items)
        }
        ReviewsAction::Delete { id } => {
            let ack = client.delete_review(&ReviewId::new(id)).await?;
            info!("Review deleted");
            print_json(&ack)
        }
    }
}
