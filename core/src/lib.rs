pub mod db;
pub mod entry;
pub mod filter;
pub mod models;
pub mod openfoodfacts;
pub mod pagination;
pub mod preferences;
pub mod providers;
pub mod reconcile;
pub mod selection;
pub mod session;
pub mod store;
pub mod usda;
