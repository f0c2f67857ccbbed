pub mod jwt;
pub mod problem;
pub mod util;
