//! Recommend command implementation

use anyhow::Result;

use super::{CliContext, print_json};

/// Suggest what to practise next
pub fn recommend_command(ctx: &CliContext) -> Result<()> {
    let (_, engine) = ctx.open_engine()?;
    let quest = engine.recommend_next_quest();

    if ctx.json {
        return print_json(quest);
    }

    println!("Next: {} [{}]", quest.title, quest.category.as_str());
    println!("  {}", quest.description);
    println!("  {} ({})", quest.link, quest.points_hint);
    Ok(())
}
