use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use pickup_core::dto::FeeQuoteDto;
use pickup_core::rules::effective_quantity;

#[derive(Debug, Args)]
pub struct FeeArgs {
    /// Category label; unknown labels are quoted at the default rate
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub quantity: i64,
}

pub fn quote_fee(ctx: &Context<'_>, args: FeeArgs) -> Result<()> {
    let fees = &ctx.config.fees;
    let quote = FeeQuoteDto {
        category: args.category.trim().to_string(),
        quantity: args.quantity,
        effective_quantity: effective_quantity(args.quantity),
        rate: fees.rate_for_label(&args.category),
        fee: fees.quote(&args.category, args.quantity),
    };

    if ctx.json {
        print_json(&quote)?;
    } else {
        println!(
            "{} x{} @ {} = {}",
            quote.category, quote.effective_quantity, quote.rate, quote.fee
        );
    }
    Ok(())
}
