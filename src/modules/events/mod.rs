pub mod aggregator;
pub mod controller;
pub mod repository;
pub mod router;
pub mod service;

pub use repository::{EventRepository, PgEventRepository};
pub use service::EventService;
