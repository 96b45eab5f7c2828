pub mod petrol;

pub use petrol::Petrol;
