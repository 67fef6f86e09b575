mod access;
mod envelope;
mod health;
mod product;

pub use access::{AccessLinkResponse, RedeemQuery};
pub use envelope::{Envelope, ErrorBody};
pub use health::HealthResponse;
pub use product::{ProductQuery, ProductResponse};
