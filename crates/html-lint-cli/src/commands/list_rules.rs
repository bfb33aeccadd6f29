//! List rules command implementation.

use html_lint::rules::{bundled_rules, minimal_rules, recommended_rules};
use html_lint::{builtin_rules, RuleOptions};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<32} Description", "Name");
    println!("{}", "-".repeat(80));

    let mut registry = builtin_rules();
    registry.merge(bundled_rules());

    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    for name in names {
        let description = registry
            .get(name)
            .flatten()
            .and_then(|factory| factory(&RuleOptions::new()).ok())
            .map(|rule| rule.description())
            .unwrap_or_default();
        println!("{name:<32} {description}");
    }

    let list = |rules: Vec<(&str, _)>| {
        rules
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("\nPresets:");
    println!("  recommended  - {} (default)", list(recommended_rules()));
    println!("  strict       - All rules as errors");
    println!("  minimal      - {} (for gradual adoption)", list(minimal_rules()));
    println!("  all          - All rules with their default severity");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  html-lint check --rules close-order,no-dup-id");
}
