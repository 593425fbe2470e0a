use crate::commands::{print_json, Context};
use crate::util::{now_utc, parse_pickup_date};
use anyhow::Result;
use clap::Args;
use pickup_service::NoopNotifier;

#[derive(Debug, Args)]
pub struct DatesArgs {
    /// Number of days to list, starting today
    #[arg(long)]
    pub horizon: Option<u32>,
}

#[derive(Debug, Args)]
pub struct SlotsArgs {
    #[arg(value_name = "DATE")]
    pub date: String,
}

pub fn list_dates(ctx: &Context<'_>, args: DatesArgs) -> Result<()> {
    let service = ctx.service(&NoopNotifier);
    let horizon = args.horizon.unwrap_or(ctx.config.scheduling.horizon_days);
    let dates = service.list_available_dates(now_utc(), horizon)?;

    if ctx.json {
        return print_json(&dates);
    }
    for date in dates {
        println!("{}  {}", date, date.format("%a"));
    }
    Ok(())
}

pub fn list_slots(ctx: &Context<'_>, args: SlotsArgs) -> Result<()> {
    let date = parse_pickup_date(&args.date)?;
    let service = ctx.service(&NoopNotifier);
    let openings = service.list_available_slots(date)?;

    if ctx.json {
        return print_json(&openings);
    }
    if openings.is_empty() {
        println!("no open slots on {date}");
        return Ok(());
    }
    for opening in openings {
        println!(
            "{:<10} {}  {} left",
            opening.slot.label(),
            opening.window,
            opening.remaining
        );
    }
    Ok(())
}
