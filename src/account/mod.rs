//! Accounts and their JSON-valued metadata.
//!
//! This module contains everything related to accounts:
//! - The `Account` and `AccountMeta` models
//! - Database functions for storing and querying accounts and metadata
//! - The accounts listing page

mod accounts_page;
mod db;
mod domain;

pub use accounts_page::get_accounts_page;
pub use db::{
    create_account, create_account_tables, get_account, get_account_meta, get_accounts_by_ids,
    get_all_accounts, set_account_meta,
};
pub use domain::{Account, AccountId, AccountMeta};
