mod access_log;

pub use access_log::log_access;
