//! `shopease requests` - the product request serve queue.

use clap::Subcommand;
use tracing::info;

use shopease_client::{ListQuery, ShopClient};
use shopease_core::RequestId;

use super::{CliError, PageArgs, print_json};

#[derive(Subcommand)]
pub enum RequestsAction {
    /// Pending requests waiting to be served
    Queue {
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Mark a request as served
    Serve { id: String },
}

pub async fn run(client: &ShopClient, action: RequestsAction) -> Result<(), CliError> {
    match action {
        RequestsAction::Queue { search, page } => {
            let query = ListQuery::new(page.request()?).search(search.unwrap_or_default());
            let queue = client.serve_queue(&query).await?;
            info!(count = queue.items.len(), total = queue.total, "Fetched serve queue");
            print_json(&queue)
        }
        RequestsAction::Serve { id } => {
            let ack = client.serve_request(&RequestId::new(id)).await?;
            info!("Request served");
            print_json(&ack)
        }
    }
}
