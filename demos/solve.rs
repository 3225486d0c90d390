//! Prints the narrated steps for each equation given on the command line.
//!
//! ```text
//! RUST_LOG=odesteps=debug cargo run --example solve -- "y' + 2y = e^x" "dy/dx = x*y"
//! ```

use odesteps::{StepEngine, StepKind};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        inputs = vec![
            "y' + 2y = e^x".to_string(),
            "dy/dx = x*y".to_string(),
            "y'' - y = x".to_string(),
        ];
    }

    let engine = StepEngine::new();
    for raw in &inputs {
        println!("== {} [{}]", raw, engine.identify_type(raw));
        for step in engine.solve_steps(raw) {
            println!("{:>2}. {:<14} {}", step.ordinal, step.kind.as_str(), step.display);
            println!("    {}", step.explanation);
            if let Some(hint) = &step.hint {
                println!("    hint: {hint}");
            }
            if step.kind == StepKind::Error {
                break;
            }
        }
        println!();
    }
}
