#[cfg(test)]
pub mod impl_fake;
pub mod impl_raster;
pub mod interface;
