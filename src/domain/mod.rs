pub mod access;
pub mod model;
pub mod role;
pub mod status;
