pub mod admin;
pub mod client_v1;
pub mod client_v2;
pub mod health;
