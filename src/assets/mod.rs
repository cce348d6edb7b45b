pub mod fonts;
pub mod store;
