//! List available practice programs.

use crate::catalog::{Catalog, QuestionKind};

/// Prints the program catalog with per-question timing details.
///
/// # Errors
/// - If the catalog cannot be loaded or fails validation
pub fn handle_programs() -> Result<(), anyhow::Error> {
    let catalog = Catalog::load()?;

    println!();
    println!("Available practice programs:");
    println!();

    for program in &catalog.programs {
        println!("  {}  ({})", program.name, program.id);
        println!("    {}", program.institution);
        if !program.description.is_empty() {
            println!("    {}", program.description);
        }
        for question in &program.questions {
            match question.kind {
                QuestionKind::Video => {
                    println!(
                        "      [spoken]  {}s prep, {}s answer — {}",
                        question.prep_seconds.unwrap_or(0),
                        question.max_seconds,
                        question.prompt
                    );
                }
                QuestionKind::Written => {
                    println!(
                        "      [written] {}s — {}",
                        question.max_seconds, question.prompt
                    );
                }
            }
        }
        println!();
    }

    println!("Start one with: terview practice -p <id>");

    Ok(())
}
