//! Statistics reporting.

use console::style;

use crate::download::{ChannelStats, RunStats};

/// Print statistics for a single channel.
pub fn print_channel_stats(stats: &ChannelStats) {
    let name = stats.channel_name.as_deref().unwrap_or(&stats.channel_id);

    println!();
    println!("{}", style(format!("Statistics for {}:", name)).bold());
    println!(
        "  Messages:   {} matched of {}",
        stats.messages_matched, stats.messages_fetched
    );
    println!("  Downloaded: {}", stats.downloaded);
    println!("  Skipped:    {} (already present)", stats.already_present);
    print_failures(
        stats.not_found,
        stats.abandoned,
        stats.rejected,
        stats.path_errors,
    );
    println!("  Total:      {} attachments", stats.total_attachments());
}

/// Print statistics across all channels.
pub fn print_run_stats(stats: &RunStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run Statistics:").bold());
    println!("  Channels processed: {}", stats.channels_processed);
    if stats.channels_failed > 0 {
        println!("  Channels failed:    {}", style(stats.channels_failed).red());
    }
    println!("  Downloaded: {}", style(stats.downloaded).green());
    println!("  Skipped:    {} (already present)", style(stats.already_present).yellow());
    print_failures(
        stats.not_found,
        stats.abandoned,
        stats.rejected,
        stats.path_errors,
    );
    println!("{}", style("═".repeat(50)).dim());
}

fn print_failures(not_found: u64, abandoned: u64, rejected: u64, path_errors: u64) {
    if not_found > 0 {
        println!("  Not found:  {}", style(not_found).red());
    }
    if abandoned > 0 {
        println!("  Abandoned:  {}", style(abandoned).red());
    }
    if rejected > 0 {
        println!("  Rejected:   {} (not on the Discord CDN)", style(rejected).red());
    }
    if path_errors > 0 {
        println!("  Bad paths:  {}", style(path_errors).red());
    }
}
