use crate::commands::{print_json, Context};
use crate::util::now_utc;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Token scanned from the booking's QR code
    pub token: String,
}

pub fn collect(ctx: &Context<'_>, args: CollectArgs) -> Result<()> {
    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .mark_collected(now_utc(), &args.token)?;

    if ctx.json {
        print_json(&record)?;
    } else {
        println!(
            "collected {} ({} {})",
            record.id, record.date, record.time_slot
        );
    }
    Ok(())
}
