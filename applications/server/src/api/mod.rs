/// API route modules
pub mod health;
pub mod index;
pub mod playlist;
pub mod status;
pub mod stream;
