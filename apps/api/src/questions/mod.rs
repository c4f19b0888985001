// Question persistence and the CRUD endpoints over it.
// Rows are always scoped to the authenticated owner.

pub mod handlers;
pub mod memory;
pub mod store;
