use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use kiosk_application::{CartService, CartView};
use kiosk_core::cart::Product;

use crate::context::AppContext;
use crate::render::TerminalCartView;

#[derive(Subcommand)]
pub enum CartAction {
    /// Add one unit of a product
    Add {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
    },
    /// Remove a product line
    Remove { id: u64 },
    /// Set the quantity of a line (0 or less removes it)
    Set {
        id: u64,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// One more unit of a line
    Inc { id: u64 },
    /// One fewer unit of a line
    Dec { id: u64 },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
    /// Start checkout and show the transfer reference
    Checkout,
    /// Confirm the bank transfer for the pending checkout
    Confirm,
}

pub async fn run(ctx: &AppContext, action: CartAction) -> Result<()> {
    let cart = ctx.cart_service();
    cart.hydrate();

    let view = Arc::new(TerminalCartView);
    cart.subscribe(view.clone());

    match action {
        CartAction::Add { id, name, price } => cart.add_item(Product::new(id, name, price))?,
        CartAction::Remove { id } => cart.remove_item(id),
        CartAction::Set { id, qty } => cart.set_quantity(id, qty),
        CartAction::Inc { id } => cart.increment(id),
        CartAction::Dec { id } => cart.decrement(id),
        CartAction::Show => show(&cart, view.as_ref()),
        CartAction::Clear => cart.clear(),
        CartAction::Checkout => {
            cart.checkout()?;
        }
        CartAction::Confirm => confirm(ctx, &cart).await,
    }

    Ok(())
}

fn show(cart: &CartService, view: &dyn CartView) {
    view.update_badge(cart.item_count());
    view.render_items(&cart.items(), cart.total());
    if let Some(record) = cart.pending() {
        println!();
        view.show_checkout(&record);
    }
}

async fn confirm(ctx: &AppContext, cart: &CartService) {
    if cart.confirm().is_none() {
        println!("{}", "No checkout is pending.".yellow());
        return;
    }

    let Some(url) = &ctx.config.cart.redirect_url else {
        return;
    };
    let delay = ctx.config.cart.redirect_delay_secs;
    println!(
        "{}",
        format!("Redirecting to {} in {} seconds...", url, delay).bright_black()
    );
    tokio::time::sleep(Duration::from_secs(delay)).await;
    println!("{}", url.bright_cyan().underline());
}
