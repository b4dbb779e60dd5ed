//! Catalog command implementation

use anyhow::Result;

use neurobreath_rewards::{CouponReward, catalog};

use super::{CliContext, print_json};

/// List every badge and coupon definition
pub fn catalog_command(ctx: &CliContext) -> Result<()> {
    let catalog = catalog();

    if ctx.json {
        return print_json(&catalog);
    }

    println!("Badges ({}):", catalog.badges.len());
    for badge in catalog.badges {
        println!(
            "  {} {} [{}] ({}) - {}",
            badge.icon,
            badge.title,
            badge.id,
            badge.category.label(),
            badge.description
        );
    }

    println!("\nCoupons ({}):", catalog.coupons.len());
    for coupon in catalog.coupons {
        let reward = match coupon.reward {
            CouponReward::Token { token_id } => format!("token {}", token_id),
            CouponReward::Prompt { title, .. } => format!("prompt \"{}\"", title),
        };
        println!(
            "  {} {} [{}] - {} pts, {}",
            coupon.icon, coupon.title, coupon.id, coupon.cost, reward
        );
        println!("      {}", coupon.description);
    }

    Ok(())
}
