pub mod outbid_processor;
pub mod watcher;
