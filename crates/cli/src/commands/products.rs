//! `shopease products` - catalog browsing and admin maintenance.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use tracing::info;

use shopease_client::api::types::NewProduct;
use shopease_client::media::ImageHost;
use shopease_client::{ApiError, ClientConfig, ListQuery, ShopClient, SortOrder};
use shopease_core::{Email, Price, ProductId};

use super::{CliError, PageArgs, print_json};

#[derive(Subcommand)]
pub enum ProductsAction {
    /// Browse accepted products with server-side filters
    List {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        /// Category name ("All" disables the filter)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<Price>,
        #[arg(long)]
        max_price: Option<Price>,
        /// Sort by price
        #[arg(long)]
        price_order: Option<SortOrder>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Admin product table, sorted server-side
    All {
        /// Field to sort by (e.g. likes, postTime)
        #[arg(long, default_value = "likes")]
        sort_by: String,
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one product
    Get { id: String },
    /// Add a product, uploading its image first when given a file
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        ingredients: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: Price,
        #[arg(long)]
        distributor: String,
        #[arg(long)]
        added_by_email: Email,
        /// Public image URL
        #[arg(long, conflicts_with = "image_file", required_unless_present = "image_file")]
        image_url: Option<String>,
        /// Local image to upload to the image host
        #[arg(long)]
        image_file: Option<PathBuf>,
    },
    /// Delete a product
    Delete {
        id: String,
        /// Admin email sent in the x-admin-email header
        #[arg(long)]
        admin_email: Option<Email>,
    },
}

pub async fn run(
    client: &ShopClient,
    config: &ClientConfig,
    action: ProductsAction,
) -> Result<(), CliError> {
    match action {
        ProductsAction::List {
            search,
            category,
            min_price,
            max_price,
            price_order,
            page,
        } => {
            let mut query = ListQuery::new(page.request()?)
                .search(search.unwrap_or_default())
                .category(category.unwrap_or_default());
            if let Some(min) = min_price {
                query = query.min_price(min);
            }
            if let Some(max) = max_price {
                query = query.max_price(max);
            }
            if let Some(order) = price_order {
                query = query.sort_by_price(order);
            }
            let products = client.list_products(&query, None).await?;
            info!(
                count = products.items.len(),
                total = products.total,
                "Fetched products"
            );
            print_json(&products)
        }
        ProductsAction::All {
            sort_by,
            order,
            page,
        } => {
            let query = ListQuery::new(page.request()?).sort_by(sort_by, order);
            let products = client.all_products(&query).await?;
            info!(
                count = products.items.len(),
                total = products.total,
                "Fetched admin product table"
            );
            print_json(&products)
        }
        ProductsAction::Get { id } => {
            let product = client.product(&ProductId::new(id)).await?;
            print_json(&product)
        }
        ProductsAction::Add {
            title,
            category,
            ingredients,
            description,
            price,
            distributor,
            added_by_email,
            image_url,
            image_file,
        } => {
            let image = match (image_url, image_file) {
                (Some(url), _) => url,
                (None, Some(path)) => upload_image(config, &path).await?,
                (None, None) => String::new(),
            };
            let product = NewProduct {
                title,
                category,
                image,
                ingredients,
                description,
                price,
                post_time: Some(Utc::now()),
                distributor_name: distributor,
                added_by_email,
            };
            let ack = client.add_product(&product).await?;
            info!(inserted_id = ?ack.inserted_id, "Product added");
            print_json(&ack)
        }
        ProductsAction::Delete { id, admin_email } => {
            let ack = client
                .delete_product(&ProductId::new(id), admin_email.as_ref())
                .await?;
            info!("Product deleted");
            print_json(&ack)
        }
    }
}

async fn upload_image(config: &ClientConfig, path: &std::path::Path) -> Result<String, CliError> {
    let host_config = config
        .image_host
        .as_ref()
        .ok_or(ApiError::NotConfigured("Image upload"))?;
    let bytes = tokio::fs::read(path).await?;
    let url = ImageHost::new(host_config)?.upload(&bytes).await?;
    info!(%url, "Image uploaded");
    Ok(url)
}
