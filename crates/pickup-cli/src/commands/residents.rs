use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{now_utc, parse_resident_id};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use pickup_store::repo::{ResidentNew, ResidentUpdate};

#[derive(Debug, Subcommand)]
pub enum ResidentCommand {
    Add(AddResidentArgs),
    Set(SetResidentArgs),
    Ls(ListResidentsArgs),
}

#[derive(Debug, Args)]
pub struct AddResidentArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, action = ArgAction::SetTrue)]
    pub inactive: bool,
    #[arg(long, action = ArgAction::SetTrue)]
    pub overdue: bool,
}

#[derive(Debug, Args)]
pub struct SetResidentArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_name = "BOOL")]
    pub active: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub overdue: Option<bool>,
}

#[derive(Debug, Args)]
pub struct ListResidentsArgs {}

pub fn add_resident(ctx: &Context<'_>, args: AddResidentArgs) -> Result<()> {
    let resident = ctx.store.residents().create(
        now_utc(),
        ResidentNew {
            display_name: args.name,
            email: args.email,
            active: !args.inactive,
            overdue_payments: args.overdue,
        },
    )?;

    if ctx.json {
        print_json(&resident)?;
    } else {
        println!("created {} {}", resident.id, resident.display_name);
    }
    Ok(())
}

pub fn set_resident(ctx: &Context<'_>, args: SetResidentArgs) -> Result<()> {
    let id = parse_resident_id(&args.id)?;
    let update = ResidentUpdate {
        display_name: args.name,
        email: args.email,
        active: args.active,
        overdue_payments: args.overdue,
    };
    if update.display_name.is_none()
        && update.email.is_none()
        && update.active.is_none()
        && update.overdue_payments.is_none()
    {
        return Err(invalid_input("no updates provided"));
    }

    let resident = ctx.store.residents().update(now_utc(), id, update)?;
    if ctx.json {
        print_json(&resident)?;
    } else {
        println!("updated {} {}", resident.id, resident.display_name);
    }
    Ok(())
}

pub fn list_residents(ctx: &Context<'_>, _args: ListResidentsArgs) -> Result<()> {
    let residents = ctx.store.residents().list()?;
    if ctx.json {
        return print_json(&residents);
    }
    if residents.is_empty() {
        println!("no residents");
        return Ok(());
    }
    for resident in residents {
        let mut flags = Vec::new();
        if !resident.active {
            flags.push("inactive");
        }
        if resident.overdue_payments {
            flags.push("overdue");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "{}  {} <{}>{}",
            resident.id, resident.display_name, resident.email, flags
        );
    }
    Ok(())
}
