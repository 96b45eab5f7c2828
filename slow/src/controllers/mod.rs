pub mod petrol;
