//! Terminal renderings of the chat and cart views.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use colored::Colorize;

use kiosk_application::{CartView, ChatView};
use kiosk_core::cart::{LineItem, TransactionRecord, format_amount};
use kiosk_core::conversation::{Message, MessageRole};

fn timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Prints chat bubbles to stdout with colored, role-based prefixes.
pub struct TerminalChatView {
    quick_prompts: Vec<String>,
    welcome_visible: AtomicBool,
}

impl TerminalChatView {
    pub fn new(quick_prompts: Vec<String>) -> Self {
        Self {
            quick_prompts,
            welcome_visible: AtomicBool::new(false),
        }
    }
}

impl ChatView for TerminalChatView {
    fn show_welcome(&self) {
        if self.welcome_visible.swap(true, Ordering::SeqCst) {
            return;
        }
        println!("{}", "Hello! How can I help you today?".bright_magenta().bold());
        if !self.quick_prompts.is_empty() {
            println!("{}", "Quick questions (type /quick N):".bright_black());
            for (i, prompt) in self.quick_prompts.iter().enumerate() {
                println!("  {}", format!("{}. {}", i + 1, prompt).bright_black());
            }
        }
        println!();
    }

    fn hide_welcome(&self) {
        self.welcome_visible.store(false, Ordering::SeqCst);
    }

    fn render_message(&self, message: &Message) {
        let time = timestamp();
        match message.role {
            MessageRole::User => {
                let label = format!("[{}] You:", time);
                println!("{} {}", label.green().bold(), message.content.green());
            }
            MessageRole::Assistant => {
                println!("{}", format!("[{}] Assistant:", time).bright_blue().bold());
                for line in message.content.lines() {
                    println!("  {}", line.bright_blue());
                }
            }
        }
    }

    fn render_error(&self, text: &str) {
        println!("{} {}", format!("[{}]", timestamp()).red().bold(), text.red());
    }

    fn clear_messages(&self) {
        println!("{}", "Conversation cleared.".bright_black());
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            println!("{}", "Assistant is typing...".bright_black().italic());
        }
    }
}

/// Prints the cart listing, badge and checkout details to stdout.
#[derive(Default)]
pub struct TerminalCartView;

impl CartView for TerminalCartView {
    fn update_badge(&self, count: u32) {
        println!("{}", format!("Cart: {} item(s)", count).bright_black());
    }

    fn render_items(&self, items: &[LineItem], total: f64) {
        if items.is_empty() {
            println!("{}", "Your cart is empty.".yellow());
            return;
        }
        for item in items {
            println!(
                "  {:>4}  {:<24} {:>8} x {:<3} {:>10}",
                format!("#{}", item.id).bright_black(),
                item.name,
                format_amount(item.price),
                item.quantity,
                format_amount(item.subtotal()),
            );
        }
        println!("{}", format!("Total: {}", format_amount(total)).bold());
    }

    fn show_checkout(&self, record: &TransactionRecord) {
        println!("{}", "Bank transfer details".bright_magenta().bold());
        println!("  Reference: {}", record.code.bold());
        println!("  Amount:    {}", format_amount(record.amount).bold());
        println!(
            "{}",
            "Quote the reference with your transfer, then run `kiosk cart confirm`.".bright_black()
        );
    }

    fn alert(&self, message: &str) {
        println!("{}", format!("! {}", message).yellow().bold());
    }

    fn confirmed(&self, record: &TransactionRecord) {
        println!(
            "{}",
            format!("Thank you! Transfer {} marked as sent.", record.code)
                .bright_green()
                .bold()
        );
    }
}
