pub mod marketlog_reader;
pub mod order_store;
pub mod settings_persistence;
