pub mod gallery;
pub mod health;
pub mod owner_media;
pub mod search;
