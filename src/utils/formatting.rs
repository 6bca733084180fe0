use chrono::{DateTime, Local, Utc};
use console::style;
use rust_decimal::Decimal;
use tabled::{
    settings::{Alignment, Style},
    Table, Tabled,
};

use crate::models::{
    product::{Product, Shippable},
    receipt::{CartSummary, Receipt, ShipmentNotice},
};

#[derive(Tabled)]
struct ProductTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "In Stock")]
    stock: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Shipping")]
    shipping: String,
}

#[derive(Tabled)]
struct CartTableRow {
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Unit Price")]
    unit_price: String,
    #[tabled(rename = "Line Total")]
    line_total: String,
    #[tabled(rename = "Ships")]
    ships: String,
}

pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

pub fn format_weight(weight: Decimal) -> String {
    format!("{}kg", weight.normalize())
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_catalog_table(products: &[Product], now: DateTime<Utc>) -> String {
    if products.is_empty() {
        return String::new();
    }

    let rows: Vec<ProductTableRow> = products
        .iter()
        .map(|product| ProductTableRow {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: format_money(product.price),
            stock: if product.stock == 0 {
                style("Sold out").red().to_string()
            } else {
                product.stock.to_string()
            },
            expires: match product.expires_at {
                Some(expires_at) if product.is_expired_at(now) => {
                    style(format!("Expired {}", format_date(&expires_at))).red().to_string()
                }
                Some(expires_at) => style(format_date(&expires_at)).yellow().to_string(),
                None => "-".to_string(),
            },
            shipping: product
                .as_shippable()
                .map(|s| format_weight(s.weight()))
                .unwrap_or_else(|| style("Not shippable").dim().to_string()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());

    table.to_string()
}

pub fn format_cart_table(summary: &CartSummary) -> String {
    if summary.is_empty() {
        return String::new();
    }

    let rows: Vec<CartTableRow> = summary
        .items
        .iter()
        .map(|item| CartTableRow {
            quantity: format!("{}x", item.quantity),
            name: item.name.clone(),
            unit_price: format_money(item.unit_price),
            line_total: format_money(item.line_total()),
            ships: if item.shippable { "yes" } else { "-" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n{}: {}\n",
        style("Subtotal").bold(),
        style(format_money(summary.subtotal)).green()
    ));
    output
}

pub fn format_shipment_notice(shipment: &ShipmentNotice) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", style("** Shipment notice **").bold()));
    for item in &shipment.items {
        output.push_str(&format!(
            "{}x {:<16} {}\n",
            item.quantity,
            item.name,
            format_weight(item.weight)
        ));
    }
    output.push_str(&format!(
        "Total package weight {}\n",
        format_weight(shipment.total_weight)
    ));
    output
}

pub fn format_receipt(receipt: &Receipt) -> String {
    let mut output = String::new();

    if !receipt.shipment.is_empty() {
        output.push_str(&format_shipment_notice(&receipt.shipment));
        output.push('\n');
    }

    output.push_str(&format!("{}\n", style("** Checkout receipt **").bold().green()));
    for item in &receipt.items {
        output.push_str(&format!(
            "{}x {:<16} {}\n",
            item.quantity,
            item.name,
            format_money(item.line_total())
        ));
    }
    output.push_str("----------------------\n");
    output.push_str(&format!("{}: {}\n", style("Subtotal").bold(), format_money(receipt.quote.subtotal)));
    output.push_str(&format!("{}: {}\n", style("Shipping").bold(), format_money(receipt.quote.shipping)));
    output.push_str(&format!(
        "{}: {}\n",
        style("Total").bold(),
        style(format_money(receipt.quote.total)).cyan()
    ));
    output.push_str(&format!(
        "{}: {}\n",
        style("Remaining Balance").bold(),
        style(format_money(receipt.remaining_balance)).green()
    ));

    output
}
