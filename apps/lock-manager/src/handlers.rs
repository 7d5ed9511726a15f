pub mod health;
pub mod locks;
