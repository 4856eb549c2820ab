pub mod irradiance;
pub mod position;
