pub mod availability;
pub mod issue;
pub mod message;
pub mod order;
pub mod route;
