use std::sync::Arc;
use anyhow::{Context, Result};
use chrono::Utc;
use console::{style, Emoji, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::{
    cli::args::*,
    models::{
        customer::{Customer, StoreCustomerRequest},
        product::{Product, ProductId},
    },
    repositories::InMemoryProductRepository,
    services::{CartService, CartServiceError, CheckoutError, CheckoutService},
    utils::{
        formatting::{format_cart_table, format_catalog_table, format_money, format_receipt},
        Config,
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "");
static CART: Emoji<'_, '_> = Emoji("🛒 ", "");

pub struct CliApp {
    config: Config,
    cart_service: CartService,
    checkout_service: CheckoutService,
    term: Term,
}

impl CliApp {
    pub fn new(config: Config) -> Result<Self> {
        let catalog = Product::seed_catalog(Utc::now()).context("Invalid product catalog")?;
        let product_repo = Arc::new(
            InMemoryProductRepository::new(catalog).context("Failed to load product catalog")?,
        );

        let cart_service = CartService::new(product_repo.clone());
        let checkout_service = CheckoutService::new(product_repo, config.shipping_rate);

        Ok(Self {
            config,
            cart_service,
            checkout_service,
            term: Term::stdout(),
        })
    }

    pub fn run(&self, args: Args) -> Result<()> {
        match args.command {
            Some(Commands::Catalog { format }) => self.handle_catalog(format),
            Some(Commands::Shop) | None => self.handle_shop(args.name, args.balance),
        }
    }

    fn handle_catalog(&self, format: CatalogFormat) -> Result<()> {
        let products = self.cart_service.catalog()?;
        match format {
            CatalogFormat::Table => println!("{}", format_catalog_table(&products, Utc::now())),
            CatalogFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&products).context("Failed to serialize catalog")?
            ),
        }
        Ok(())
    }

    fn handle_shop(&self, name: Option<String>, balance: Option<Decimal>) -> Result<()> {
        println!("{} {}", CART, style("Welcome to the shop!").bold().cyan());

        let balance = balance.unwrap_or(self.config.starting_balance);
        if balance.is_sign_negative() && !balance.is_zero() {
            anyhow::bail!("Starting balance must not be negative");
        }
        let customer = match name.map(|name| StoreCustomerRequest::new(name, balance)) {
            Some(Ok(request)) => request,
            Some(Err(e)) => {
                println!("{} {}", WARNING, style(&e).yellow());
                warn!("Rejected --name: {}", e);
                self.prompt_customer(balance)?
            }
            None => self.prompt_customer(balance)?,
        };
        let mut customer = Customer::new(customer).context("Failed to create customer")?;
        info!(
            "Session started for '{}' with balance {}",
            customer.name,
            customer.balance()
        );

        let theme = ColorfulTheme::default();
        loop {
            if self.term.is_term() {
                self.term.clear_screen()?;
            }

            println!(
                "\nHello {}, what would you like to do?",
                style(&customer.name).green()
            );
            println!(
                "Balance: {}  Cart: {} line(s)",
                style(format_money(customer.balance())).yellow(),
                customer.cart.len()
            );

            let selection = Select::with_theme(&theme)
                .with_prompt("Your choice")
                .items(&MenuChoice::ALL)
                .default(0)
                .interact_on(&self.term)?;

            match MenuChoice::ALL[selection] {
                MenuChoice::AddToCart => self.handle_add_to_cart(&mut customer)?,
                MenuChoice::ViewCart => self.handle_view_cart(&customer)?,
                MenuChoice::Checkout => self.handle_checkout(&mut customer)?,
                MenuChoice::Exit => break,
            }

            self.pause()?;
        }

        info!("Session ended for '{}'", customer.name);
        println!("Goodbye, {}!", style(&customer.name).green());
        Ok(())
    }

    fn prompt_customer(&self, balance: Decimal) -> Result<StoreCustomerRequest> {
        let theme = ColorfulTheme::default();

        let name: String = Input::with_theme(&theme)
            .with_prompt("Enter your name")
            .validate_with(|input: &String| -> Result<(), String> {
                StoreCustomerRequest::new(input.clone(), balance)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()?;

        StoreCustomerRequest::new(name, balance).context("Invalid customer")
    }

    fn handle_add_to_cart(&self, customer: &mut Customer) -> Result<()> {
        let products = self.cart_service.catalog()?;
        println!("\n{} {}", INFO, style("Available Products").bold().cyan());
        println!("{}", format_catalog_table(&products, Utc::now()));

        let theme = ColorfulTheme::default();
        let raw_id: String = Input::with_theme(&theme)
            .with_prompt("Enter product ID to add to cart (or 0 to go back)")
            .default("0".to_string())
            .interact_text()?;

        let product_id = match raw_id.trim().parse::<ProductId>() {
            Ok(0) => return Ok(()),
            Ok(id) => id,
            Err(_) => {
                println!("{} Invalid selection: '{}' is not a product ID", CROSS, raw_id.trim());
                return Ok(());
            }
        };

        // expired products are refused before asking for a quantity
        let product = match self.cart_service.available_product(product_id) {
            Ok(product) => product,
            Err(e) => {
                self.report_cart_error(e);
                return Ok(());
            }
        };

        let raw_quantity: String = Input::with_theme(&theme)
            .with_prompt(format!("Enter quantity (in stock: {})", product.stock))
            .interact_text()?;

        let quantity = match raw_quantity.trim().parse::<u32>() {
            Ok(quantity) => quantity,
            Err(_) => {
                println!("{} Invalid quantity.", CROSS);
                return Ok(());
            }
        };

        match self.cart_service.add_to_cart(customer, product.id, quantity) {
            Ok(item) => {
                println!(
                    "{} Added {}x {} to cart ({}).",
                    CHECKMARK,
                    item.quantity,
                    style(&item.name).green(),
                    format_money(item.line_total())
                );
            }
            Err(e) => self.report_cart_error(e),
        }

        Ok(())
    }

    fn handle_view_cart(&self, customer: &Customer) -> Result<()> {
        let summary = self.cart_service.view_cart(customer)?;

        println!("\n{} {}", CART, style("Your Cart").bold().cyan());
        if summary.is_empty() {
            println!("Cart is empty.");
        } else {
            println!("{}", format_cart_table(&summary));
            println!(
                "Shipping is charged at checkout: {} per kg.",
                format_money(self.checkout_service.shipping_rate())
            );
        }

        Ok(())
    }

    fn handle_checkout(&self, customer: &mut Customer) -> Result<()> {
        match self.checkout_service.checkout(customer) {
            Ok(receipt) => {
                println!("\n{} {}", CHECKMARK, style("Checkout Successful").bold().green());
                println!("{}", format_receipt(&receipt));
            }
            Err(CheckoutError::EmptyCart) => {
                println!("{} Cart is empty.", WARNING);
            }
            Err(CheckoutError::InsufficientBalance { total, balance }) => {
                println!(
                    "{} Insufficient balance. Total: {}, Your balance: {}",
                    CROSS,
                    style(format_money(total)).red(),
                    style(format_money(balance)).yellow()
                );
            }
            Err(e) => {
                println!("{} Checkout failed: {}", CROSS, style(&e).red());
                error!("Checkout failed: {}", e);
            }
        }

        Ok(())
    }

    fn report_cart_error(&self, e: CartServiceError) {
        match e {
            CartServiceError::InvalidSelection { reason } => {
                println!("{} Invalid selection: {}", CROSS, reason);
                warn!("Invalid selection: {}", reason);
            }
            CartServiceError::ExpiredProduct { name } => {
                println!("{} Cannot add expired product '{}'.", CROSS, style(name).red());
            }
            CartServiceError::RepositoryError(e) => {
                println!("{} Failed to update cart: {}", CROSS, style(&e).red());
                error!("Failed to update cart: {}", e);
            }
        }
    }

    fn pause(&self) -> Result<()> {
        if !self.term.is_term() {
            return Ok(());
        }
        println!("{}", style("Press any key to continue...").dim());
        self.term.read_key()?;
        Ok(())
    }
}
