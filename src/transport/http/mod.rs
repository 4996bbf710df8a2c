pub mod auth;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod activity;
    pub mod blockchain;
    pub mod common;
    pub mod customs;
    pub mod documents;
    pub mod finance;
    pub mod forwarder;
    pub mod health;
    pub mod insurance;
    pub mod port;
    pub mod shipments;
    pub mod users;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
