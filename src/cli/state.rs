//! State command implementation

use anyhow::Result;

use neurobreath_rewards::Badge;

use super::{CliContext, print_json};

/// Show points, badges, coupons and tokens
pub fn state_command(ctx: &CliContext) -> Result<()> {
    let (_, engine) = ctx.open_engine()?;
    let state = engine.state();

    if ctx.json {
        return print_json(&state);
    }

    println!(
        "Points: {} available / {} earned ({} spent)\n",
        state.available_points, state.total_points, state.wallet.points_spent
    );

    println!("Badges ({}):", state.earned_badges.len());
    for id in &state.earned_badges {
        match Badge::get(id) {
            Some(badge) => {
                let new = if state.newly_earned.contains(id) {
                    " (new!)"
                } else {
                    ""
                };
                println!("  {} {}{}", badge.icon, badge.title, new);
            }
            // Earned under an id the catalog no longer has
            None => println!("  ? {}", id),
        }
    }

    println!("\nCoupons:");
    for status in &state.coupons {
        let label = if status.redeemed {
            "redeemed"
        } else if status.redeemable {
            "ready"
        } else if !status.unlocked {
            "locked"
        } else {
            "need points"
        };
        println!(
            "  {} {} [{}] - {} pts ({})",
            status.coupon.icon, status.coupon.title, status.coupon.id, status.coupon.cost, label
        );
    }

    let tokens: Vec<_> = state.wallet.tokens.iter().filter(|(_, n)| **n > 0).collect();
    if !tokens.is_empty() {
        println!("\nTokens:");
        for (id, count) in tokens {
            println!("  {} x{}", id, count);
        }
    }

    if !state.wallet.prompt_vault.is_empty() {
        println!("\nPrompt vault:");
        for entry in state.wallet.prompt_vault.values() {
            println!("  {}", entry.title);
        }
    }

    Ok(())
}
