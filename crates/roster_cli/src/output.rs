use owo_colors::OwoColorize;
use roster_core::{NameType, User};

/// Standard output formatting for the CLI
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        println!("  {} {}", label.bright_blue(), value);
    }

    /// Print a warning message (indented)
    pub fn warning(&self, message: &str) {
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
    }

    /// Print one user as a single line
    pub fn user_row(&self, user: &User) {
        let marker = if user.is_self { "★" } else { "•" };
        println!(
            "    {} {} {} {}",
            marker,
            user.full_name.bold(),
            tier_label(user.name_type),
            user.id().to_string().dimmed()
        );
    }

    /// Print every field of a user
    pub fn user_details(&self, user: &User) {
        self.info("Name:", &user.full_name);
        self.info("First name:", &user.first_name);
        self.info("Tier:", &tier_label(user.name_type));
        self.info("ID:", &user.id().to_string());
        if let Some(photo) = &user.photo_url {
            self.info("Photo:", photo);
        }
        if !user.emails.is_empty() {
            self.info("Emails:", &user.emails.join(", "));
        }
        if user.is_self {
            self.status("This is the logged-in account");
        }
    }
}

fn tier_label(name_type: NameType) -> String {
    let label = format!("[{}]", name_type);
    match name_type {
        NameType::Real => label.bright_green().to_string(),
        NameType::Numeric => label.yellow().to_string(),
        NameType::Default => label.bright_red().to_string(),
    }
}
