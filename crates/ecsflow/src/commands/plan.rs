use colored::Colorize;
use ecsflow_cloud::Step;

fn join_or_dash(items: &[&str]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub fn handle() {
    println!(
        "{}",
        format!("Provisioning plan ({} steps)", Step::ALL.len()).bold()
    );
    println!(
        "{}",
        "Steps run in order and stop at the first failure. Nothing is rolled back.".dimmed()
    );
    println!();

    for step in Step::ALL {
        println!(
            "  {:>2}. {:<46} {}",
            step.number(),
            step.description(),
            format!("[{}]", step.kind()).cyan()
        );
        println!(
            "      needs: {}  produces: {}",
            join_or_dash(step.depends_on()),
            join_or_dash(step.produces())
        );
    }
}
