pub mod analysis;
pub mod bands;
pub mod clock;
pub mod decode;
pub mod features;
