mod dashmap_session_registry;

pub use dashmap_session_registry::DashMapSessionRegistry;
