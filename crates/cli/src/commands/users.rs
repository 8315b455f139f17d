//! `shopease users` - accounts and roles.

use clap::Subcommand;
use serde::Serialize;
use tracing::info;

use shopease_client::access::lookup_role;
use shopease_client::{ListQuery, ShopClient};
use shopease_core::{Email, Role, UserId};

use super::{CliError, PageArgs, print_json};

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List {
        /// Search by name or email
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Resolve the role for an email (falls back to "user")
    Role { email: Email },
    /// Promote a user to admin
    MakeAdmin { id: String },
}

#[derive(Serialize)]
struct RoleOutput<'a> {
    email: &'a str,
    role: Role,
}

pub async fn run(client: &ShopClient, action: UsersAction) -> Result<(), CliError> {
    match action {
        UsersAction::List { search, page } => {
            let query = ListQuery::new(page.request()?).search(search.unwrap_or_default());
            let users = client.users(&query).await?;
            info!(count = users.items.len(), total = users.total, "Fetched users");
            print_json(&users)
        }
        UsersAction::Role { email } => {
            let role = lookup_role(client, &email).await;
            print_json(&RoleOutput {
                email: email.as_str(),
                role,
            })
        }
        UsersAction::MakeAdmin { id } => {
            let ack = client.make_admin(&UserId::new(id)).await?;
            info!("User promoted to admin");
            print_json(&ack)
        }
    }
}
