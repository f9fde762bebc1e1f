pub mod health;
pub mod iframe;
pub mod remembered;
