// lib.rs — Exposes internal modules for integration tests.
//
// The binary entry point lives in main.rs.

pub mod backend;
pub mod cursor;
pub mod document_store;
pub mod handlers;
pub mod imports;
pub mod parser_pool;
pub mod path_resolve;
pub mod state;
pub mod suggest;
pub mod symbols;
