use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Parser)]
#[command(name = "shop-cart")]
#[command(about = "An interactive shopping cart with checkout and weight-based shipping")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Customer name (prompted for when omitted)
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Starting balance, overrides SHOP_STARTING_BALANCE
    #[arg(short, long, global = true)]
    pub balance: Option<Decimal>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive shopping session (default)
    Shop,
    /// Print the product catalog and exit
    Catalog {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: CatalogFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CatalogFormat {
    Table,
    Json,
}

impl fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogFormat::Table => write!(f, "table"),
            CatalogFormat::Json => write!(f, "json"),
        }
    }
}

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddToCart,
    ViewCart,
    Checkout,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 4] = [
        MenuChoice::AddToCart,
        MenuChoice::ViewCart,
        MenuChoice::Checkout,
        MenuChoice::Exit,
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::AddToCart => write!(f, "View Products & Add to Cart"),
            MenuChoice::ViewCart => write!(f, "View Cart"),
            MenuChoice::Checkout => write!(f, "Checkout"),
            MenuChoice::Exit => write!(f, "Exit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults_to_no_command() {
        let args = Args::try_parse_from(["shop-cart"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.balance.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_catalog_json() {
        let args = Args::try_parse_from(["shop-cart", "catalog", "--format", "json"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Catalog {
                format: CatalogFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_balance_and_name() {
        let args =
            Args::try_parse_from(["shop-cart", "--name", "Ada", "--balance", "120.50", "shop"]).unwrap();
        assert_eq!(args.name.as_deref(), Some("Ada"));
        assert_eq!(args.balance, Some(Decimal::new(12050, 2)));
        assert!(matches!(args.command, Some(Commands::Shop)));
    }

    #[test]
    fn test_parse_rejects_bad_balance() {
        assert!(Args::try_parse_from(["shop-cart", "--balance", "lots"]).is_err());
    }

    #[test]
    fn test_menu_order() {
        let labels: Vec<String> = MenuChoice::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels[0], "View Products & Add to Cart");
        assert_eq!(labels[3], "Exit");
    }
}
