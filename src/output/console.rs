//! Console output utilities.

use console::style;

use crate::config::Config;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     discord-dl                                        ║
║     Channel attachment downloader for Discord         ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(config: &Config) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Channels:  {}", config.channels.ids.join(", "));
    println!("  Directory: {}", config.output.path.display());
    println!("  Server:    {}", config.output.channel_format);
    println!("  DM:        {}", config.output.dm_format);
    if let Some(count) = config.filters.message_limit() {
        println!("  Messages:  {} per channel", count);
    }
    if config.output.simulate {
        println!("  Mode:      {}", style("simulate").yellow());
    }
    println!();
}
