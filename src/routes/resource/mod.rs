mod handler;

pub use handler::{INFO, info, latest_item, latest_payload};
