//! Output formatting for CLI

use crate::training::TrainingSummary;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

pub fn print_training_summary(summary: &TrainingSummary) {
    print_section("Training complete");
    print_kv("Agent", summary.agent.as_str());
    print_kv("Opponent", &summary.opponent);
    if summary.games > 0 {
        print_kv("Games", &format_number(summary.games));
    }
    if summary.planning_steps > 0 {
        print_kv("Planning steps", &format_number(summary.planning_steps as u64));
    }
    if let Some(result) = &summary.result {
        print_kv(
            "Wins / draws / losses",
            &format!("{} / {} / {}", result.wins, result.draws, result.losses),
        );
        print_kv("Win rate", &format!("{:.1}%", result.win_rate * 100.0));
    }
    print_kv("Saved to", &summary.saved_to);
}
