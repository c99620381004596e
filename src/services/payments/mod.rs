pub mod client;
pub mod stripe;

pub use client::{PaymentError, PaymentGateway, PaymentIntent};
pub use stripe::StripeGateway;
