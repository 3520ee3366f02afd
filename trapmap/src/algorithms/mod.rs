pub mod corridor;
pub mod split;
