pub mod outbox;
pub mod roster;
pub mod schema;
pub mod store;

pub use store::Store;
