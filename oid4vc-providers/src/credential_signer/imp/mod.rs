pub mod internal;
pub mod sd_jwt;
