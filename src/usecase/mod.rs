pub mod auth;
pub mod contracts;
pub mod error;
pub mod jwt;
pub mod locations;
pub mod password;
pub mod reviews;
