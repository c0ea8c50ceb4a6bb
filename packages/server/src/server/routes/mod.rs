// HTTP routes
pub mod extract;
pub mod health;
pub mod review;
pub mod sample;

pub use extract::*;
pub use health::*;
pub use review::*;
pub use sample::*;
