//! Redeem and use-token command implementations

use anyhow::Result;
use serde::Serialize;

use neurobreath_rewards::CommandOutcome;

use super::{CliContext, print_json};

#[derive(Serialize)]
struct CommandOutput<T: Serialize> {
    #[serde(flatten)]
    outcome: CommandOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}

/// Spend points on a coupon
pub fn redeem_command(ctx: &CliContext, coupon_id: &str) -> Result<()> {
    let (_, engine) = ctx.open_engine()?;
    let result = engine.redeem_coupon(coupon_id);

    if ctx.json {
        let outcome = CommandOutcome::from(&result);
        return print_json(&CommandOutput {
            outcome,
            result: result.ok(),
        });
    }

    match result {
        Ok(redemption) => {
            println!(
                "Redeemed {} ({} points left)",
                redemption.coupon_id, redemption.available_points
            );
            if let Some(balance) = redemption.token_balance {
                println!("Token balance: {}", balance);
            }
            if let Some(prompt) = redemption.prompt {
                println!("\n{}\n\n{}", prompt.title, prompt.text);
            }
        }
        Err(e) => eprintln!("Cannot redeem: {} ({})", e, e.reason()),
    }

    Ok(())
}

/// Use one token from the wallet
pub fn use_token_command(ctx: &CliContext, token_id: &str) -> Result<()> {
    let (_, engine) = ctx.open_engine()?;
    let result = engine.use_token(token_id);

    if ctx.json {
        let outcome = CommandOutcome::from(&result);
        return print_json(&CommandOutput {
            outcome,
            result: result.ok().map(|remaining| serde_json::json!({ "remaining": remaining })),
        });
    }

    match result {
        Ok(remaining) => println!("Used one {} token ({} left)", token_id, remaining),
        Err(e) => eprintln!("Cannot use token: {} ({})", e, e.reason()),
    }

    Ok(())
}
