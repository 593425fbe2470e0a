use crate::commands::{print_json, Context};
use crate::util::{now_utc, parse_collection_id, parse_resident_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use pickup_core::{CollectionRecord, PaymentMethod};
use std::str::FromStr;

#[derive(Debug, Subcommand)]
pub enum PaymentCommand {
    Paid(PaidArgs),
    #[command(name = "cash-pending")]
    CashPending(PaymentArgs),
    Unpaid(PaymentArgs),
}

#[derive(Debug, Args)]
pub struct PaymentArgs {
    pub id: String,
    #[arg(long, value_name = "ID")]
    pub resident: String,
}

#[derive(Debug, Args)]
pub struct PaidArgs {
    pub id: String,
    #[arg(long, value_name = "ID")]
    pub resident: String,
    /// card, bank or cash; keeps the recorded method when omitted
    #[arg(long)]
    pub method: Option<String>,
}

pub fn mark_paid(ctx: &Context<'_>, args: PaidArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let id = parse_collection_id(&args.id)?;
    let method = args
        .method
        .as_deref()
        .map(PaymentMethod::from_str)
        .transpose()?;

    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .mark_paid(now_utc(), resident_id, id, method)?;
    report(ctx, &record)
}

pub fn mark_cash_pending(ctx: &Context<'_>, args: PaymentArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let id = parse_collection_id(&args.id)?;

    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .mark_cash_pending(now_utc(), resident_id, id)?;
    report(ctx, &record)
}

pub fn mark_unpaid(ctx: &Context<'_>, args: PaymentArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let id = parse_collection_id(&args.id)?;

    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .mark_unpaid(now_utc(), resident_id, id)?;
    report(ctx, &record)
}

fn report(ctx: &Context<'_>, record: &CollectionRecord) -> Result<()> {
    if ctx.json {
        return print_json(record);
    }
    match record.payment_method {
        Some(method) => println!("{} payment {} ({method})", record.id, record.payment_status),
        None => println!("{} payment {}", record.id, record.payment_status),
    }
    Ok(())
}
