mod cli;
mod demo;
mod ui;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command, Leg, PaymentLeg};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movemaster::config::MoveConfig;
use movemaster::store::JobStore;
use movemaster::{ChargeLedger, Job, JobDesk, Role, WorkflowError};
use ui::Board;

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = MoveConfig::load().context("failed to load configuration")?;
    let store = JobStore::new(cli.file.clone().unwrap_or_else(|| config.job_file.clone()));
    let role = Role::from(cli.role);
    let board = Board::default();

    match cli.command {
        Command::Demo => {
            let audit = demo::run(&config).await?;
            board.print_audit(&audit);
        }
        Command::New { force } => {
            if store.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite",
                    store.path().display()
                );
            }
            let job = demo::sample_job()?;
            store.save(&job)?;
            board.committed(&format!("created {}", job.id), &job);
        }
        command => {
            let job = store.load()?;
            let mut desk = JobDesk::from_config(job, &config)?;
            if let Some(result) = run_command(command, role, &mut desk, &board)? {
                match result {
                    Ok(job) => {
                        store.save(&job)?;
                        board.committed("saved", &job);
                    }
                    Err(e) => {
                        board.rejected(&e.to_string());
                        std::process::exit(1);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Apply one command to the desk. Read-only commands print and return `None`.
fn run_command(
    command: Command,
    role: Role,
    desk: &mut JobDesk,
    board: &Board,
) -> Result<Option<Result<Job, WorkflowError>>> {
    let result = match command {
        Command::Status => {
            board.print_status(desk.job(), role, &desk.gate_board(role), desk.custody_stage());
            return Ok(None);
        }
        Command::Ledger => {
            board.print_ledger(&desk.ledger_totals()?);
            return Ok(None);
        }
        Command::Payout => {
            match desk.payout(role)? {
                Some(payout) => board.print_payout(&payout),
                None => board.rejected(&format!("{role} is not paid per job")),
            }
            return Ok(None);
        }
        Command::Items => {
            board.print_inventory(&desk.inventory_groups());
            return Ok(None);
        }
        Command::Audit => {
            board.print_audit(&desk.audit());
            return Ok(None);
        }
        Command::Advance { route } => desk.advance(role, route.map(Into::into)),
        Command::Sign { leg: Leg::Origin } => desk.record_origin_signature(role),
        Command::Sign { leg: Leg::Delivery } => desk.record_delivery_signature(role),
        Command::Pay { amount } => desk.register_payment(amount),
        Command::ClearPayment { leg: PaymentLeg::Pickup } => desk.clear_pickup_payment(role),
        Command::ClearPayment { leg: PaymentLeg::Delivery } => desk.clear_delivery_payment(role),
        Command::Arrive => desk.record_warehouse_arrival(role),
        Command::Handshake => desk.record_warehouse_handshake(role),
        Command::Schedule { date } => desk.schedule_outbound(date),
        Command::Dispatch => desk.dispatch_from_warehouse(role),
        Command::AddItems {
            name,
            quantity,
            condition,
        } => desk.add_inventory(role, &name, condition.as_deref(), quantity),
        Command::VerifyGroup { key, undo } => desk.verify_inventory_group(role, &key, !undo),
        Command::EditGroup {
            key,
            name,
            condition,
        } => desk.edit_inventory_group(role, &key, &name, &condition),
        Command::DeleteGroup { key } => desk.delete_inventory_group(role, &key),
        Command::Charges { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let revised: ChargeLedger = serde_json::from_str(&contents)
                .with_context(|| format!("invalid charge ledger in {}", file.display()))?;
            desk.revise_charges(role, revised)
        }
        Command::Demo | Command::New { .. } => return Ok(None),
    };
    Ok(Some(result))
}
