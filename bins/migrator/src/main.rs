//! Applies the Budgetrack schema: master data, line items, monthly
//! allocations, actuals, purchase orders, currency rates and the
//! append-only audit log.
//!
//! Reads `DATABASE_URL` (a `.env` file is honored). Subcommands follow
//! `sea-orm-cli migrate`: `up`, `down`, `status`, `fresh`, `refresh`, `reset`.

use budgetrack_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(Migrator).await;
}
