use crate::commands::{print_json, Context};
use crate::util::{
    format_optional_timestamp, normalize_optional_text, now_utc, parse_collection_id,
    parse_coordinates, parse_pickup_date, parse_resident_id,
};
use anyhow::Result;
use clap::Args;
use pickup_core::dto::CollectionListItemDto;
use pickup_core::rules::slot_window;
use pickup_core::time::format_timestamp_datetime;
use pickup_core::{CollectionRecord, CollectionRequest, TimeSlot, WasteCategory};
use pickup_service::RescheduleRequest;
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct BookArgs {
    #[arg(long, value_name = "ID")]
    pub resident: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub items: String,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub quantity: i64,
    #[arg(long, value_name = "DATE")]
    pub date: String,
    #[arg(long)]
    pub slot: String,
    #[arg(long)]
    pub location: String,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,
    #[arg(long)]
    pub instructions: Option<String>,
}

#[derive(Debug, Args)]
pub struct RescheduleArgs {
    pub id: String,
    #[arg(long, value_name = "ID")]
    pub resident: String,
    #[arg(long, value_name = "DATE")]
    pub date: String,
    #[arg(long)]
    pub slot: String,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Args)]
pub struct CancelArgs {
    pub id: String,
    #[arg(long, value_name = "ID")]
    pub resident: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, value_name = "ID")]
    pub resident: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
    #[arg(long, value_name = "ID")]
    pub resident: String,
}

pub fn book(ctx: &Context<'_>, args: BookArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let request = CollectionRequest {
        category: WasteCategory::from_str(&args.category)?,
        items_description: args.items.trim().to_string(),
        quantity: args.quantity,
        date: parse_pickup_date(&args.date)?,
        time_slot: TimeSlot::from_str(&args.slot)?,
        location: args.location.trim().to_string(),
        coordinates: parse_coordinates(args.lat, args.lng)?,
        instructions: normalize_optional_text(args.instructions),
    };

    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .schedule(now_utc(), resident_id, request)?;

    if ctx.json {
        print_json(&record)?;
    } else {
        println!(
            "booked {} on {} {} fee {}",
            record.id, record.date, record.time_slot, record.fee
        );
        println!("qr {}", record.qr_token);
    }
    Ok(())
}

pub fn reschedule(ctx: &Context<'_>, args: RescheduleArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let id = parse_collection_id(&args.id)?;
    let request = RescheduleRequest {
        date: parse_pickup_date(&args.date)?,
        time_slot: TimeSlot::from_str(&args.slot)?,
        category: args
            .category
            .as_deref()
            .map(WasteCategory::from_str)
            .transpose()?,
        quantity: args.quantity,
    };

    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .reschedule(now_utc(), resident_id, id, request)?;

    if ctx.json {
        print_json(&record)?;
    } else {
        println!(
            "rescheduled {} to {} {} fee {}",
            record.id, record.date, record.time_slot, record.fee
        );
    }
    Ok(())
}

/// Cancellation deletes the booking; the printed snapshot is all that remains.
pub fn cancel(ctx: &Context<'_>, args: CancelArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let id = parse_collection_id(&args.id)?;

    let notifier = ctx.notifier()?;
    let snapshot = ctx
        .service(notifier.as_ref())
        .cancel(now_utc(), resident_id, id)?;

    if ctx.json {
        print_json(&snapshot)?;
    } else {
        println!(
            "cancelled {} ({} {} {})",
            snapshot.id, snapshot.date, snapshot.time_slot, snapshot.category
        );
    }
    Ok(())
}

pub fn list_collections(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let notifier = ctx.notifier()?;
    let records = ctx
        .service(notifier.as_ref())
        .list_for_user(resident_id)?;
    let items: Vec<CollectionListItemDto> = records.iter().map(list_item).collect();

    if ctx.json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("no collections");
        return Ok(());
    }
    for item in items {
        println!(
            "{}  {} {:<9} {:<10} x{} fee {} {} {}",
            item.id,
            item.date,
            item.time_slot.label(),
            item.category.label(),
            item.quantity,
            item.fee,
            item.status,
            item.payment_status
        );
    }
    Ok(())
}

pub fn show_collection(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let resident_id = parse_resident_id(&args.resident)?;
    let id = parse_collection_id(&args.id)?;
    let notifier = ctx.notifier()?;
    let record = ctx
        .service(notifier.as_ref())
        .get_for_user(resident_id, id)?;

    if ctx.json {
        return print_json(&record);
    }
    print_detail(ctx, &record);
    Ok(())
}

fn list_item(record: &CollectionRecord) -> CollectionListItemDto {
    CollectionListItemDto {
        id: record.id,
        date: record.date,
        time_slot: record.time_slot,
        category: record.category,
        quantity: record.quantity,
        fee: record.fee,
        status: record.status,
        payment_status: record.payment_status,
    }
}

fn print_detail(ctx: &Context<'_>, record: &CollectionRecord) {
    let offset = ctx.config.scheduling.utc_offset;
    println!("id: {}", record.id);
    println!(
        "when: {} {} ({})",
        record.date,
        record.time_slot,
        slot_window(record.date, record.time_slot)
    );
    println!(
        "what: {} x{} ({})",
        record.category.label(),
        record.quantity,
        record.items_description
    );
    println!("where: {}", record.location);
    if let Some(coordinates) = record.coordinates {
        println!("coordinates: {},{}", coordinates.latitude, coordinates.longitude);
    }
    if let Some(instructions) = &record.instructions {
        println!("instructions: {instructions}");
    }
    println!("fee: {}", record.fee);
    match record.payment_method {
        Some(method) => println!("payment: {} ({method})", record.payment_status),
        None => println!("payment: {}", record.payment_status),
    }
    println!("status: {}", record.status);
    println!("qr: {}", record.qr_token);
    println!("created: {}", format_timestamp_datetime(record.created_at, offset));
    println!(
        "collected: {}",
        format_optional_timestamp(record.collected_at, offset)
    );
}
