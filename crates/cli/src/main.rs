//! Pixelwear CLI - offline cart and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Inspect or edit a cart stored in a directory
//! pw-cli cart show --dir ./cart
//! pw-cli cart add --dir ./cart --product-id 3 --name "Zelda Hoodie" --price 59.99 --size M
//! pw-cli cart update --dir ./cart --key "3::::M" --quantity 2
//! pw-cli cart remove --dir ./cart --key "3::::M"
//! pw-cli cart clear --dir ./cart
//!
//! # Run the catalog filter pipeline over a backend product export
//! pw-cli catalog filter --products export.json --search zelda --sort price-asc
//! pw-cli catalog categories --products export.json
//! ```
//!
//! # Commands
//!
//! - `cart` - Manage a file-backed cart
//! - `catalog` - Filter and inspect a product export

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pixelwear_core::ProductId;
use pixelwear_core::catalog::SortKey;
use rust_decimal::Decimal;

mod commands;
mod storage;

use commands::cart::NewLine;
use commands::catalog::FilterArgs;

#[derive(Parser)]
#[command(name = "pw-cli")]
#[command(author, version, about = "Pixelwear CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage a cart stored in a local directory
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect a backend product export
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Args)]
struct CartDir {
    /// Directory holding `cart.json`
    #[arg(short, long, default_value = ".pixelwear")]
    dir: PathBuf,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart with its totals
    Show {
        #[command(flatten)]
        dir: CartDir,
    },
    /// Add a line (merges with the same product, color and size)
    Add {
        #[command(flatten)]
        dir: CartDir,

        /// Product ID (numeric or text)
        #[arg(long)]
        product_id: ProductId,

        /// Display name
        #[arg(long)]
        name: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Quantity (0 is treated as 1)
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Selected color
        #[arg(long, default_value = "")]
        color: String,

        /// Selected size
        #[arg(long, default_value = "")]
        size: String,
    },
    /// Set a line's quantity (0 or below removes it)
    Update {
        #[command(flatten)]
        dir: CartDir,

        /// Line key (`product_id::color::size`)
        #[arg(short, long)]
        key: String,

        #[arg(short, long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        #[command(flatten)]
        dir: CartDir,

        /// Line key (`product_id::color::size`)
        #[arg(short, long)]
        key: String,
    },
    /// Empty the cart
    Clear {
        #[command(flatten)]
        dir: CartDir,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Print the filtered, sorted view
    Filter {
        /// Product export (JSON array of backend rows)
        #[arg(short, long)]
        products: PathBuf,

        /// Exact category ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,

        /// Inclusive lower price bound
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Inclusive upper price bound
        #[arg(long)]
        max_price: Option<Decimal>,

        /// `featured`, `price-asc`, `price-desc` or `name`
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Print the distinct categories
    Categories {
        /// Product export (JSON array of backend rows)
        #[arg(short, long)]
        products: PathBuf,
    },
}

fn main() {
    // Initialize tracing (stderr, so stdout stays valid JSON)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pw_cli=info,pixelwear_storefront=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show { dir } => commands::cart::show(&dir.dir)?,
            CartAction::Add {
                dir,
                product_id,
                name,
                price,
                quantity,
                image,
                color,
                size,
            } => commands::cart::add(
                &dir.dir,
                NewLine {
                    product_id,
                    name,
                    price,
                    quantity,
                    image,
                    color,
                    size,
                },
            )?,
            CartAction::Update { dir, key, quantity } => {
                commands::cart::update(&dir.dir, &key, quantity)?;
            }
            CartAction::Remove { dir, key } => commands::cart::remove(&dir.dir, &key)?,
            CartAction::Clear { dir } => commands::cart::clear(&dir.dir)?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Filter {
                products,
                category,
                search,
                min_price,
                max_price,
                sort,
            } => commands::catalog::filter(
                &products,
                FilterArgs {
                    category,
                    search,
                    min_price,
                    max_price,
                    sort,
                },
            )?,
            CatalogAction::Categories { products } => commands::catalog::categories(&products)?,
        },
    }
    Ok(())
}
