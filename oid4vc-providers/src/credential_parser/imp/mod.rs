pub mod mdoc;
pub mod sd_jwt;
