/// A client for the registration server
pub mod client;
pub use client::Client;

/// Things that can go wrong in the API
pub mod error;
pub use error::Error;

/// Where users go to log in once they're registered
pub mod login;

/// Register with the server
pub mod register;
