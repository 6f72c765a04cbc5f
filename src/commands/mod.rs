pub mod check;
pub mod migrate;
pub mod validate;
pub mod versions;
