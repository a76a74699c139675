// Services module - business logic layer

pub mod auth;
pub mod items;

// Catalog providers
pub mod itunes;
pub mod lyrics;
pub mod tmdb;
pub mod translate;
