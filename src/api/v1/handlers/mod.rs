pub mod health;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod tools;
pub mod users;
