//! Categories for grouping transaction journals.
//!
//! This module contains everything related to categories:
//! - The `Category` model and its validated name type
//! - Database functions, including soft deletion and the polymorphic
//!   notes and attachments that can hang off a category
//! - The category pages and endpoints

pub mod create;
mod db;
mod delete;
pub mod domain;
mod list;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    Attachment, add_category_attachment, create_category, create_category_tables,
    get_all_categories, get_category, get_category_attachments, get_category_note,
    link_journal_to_category, set_category_note, soft_delete_category,
    unlink_journal_from_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName};
pub use list::get_categories_page;
