pub mod distance;
pub mod export;
pub mod gate;
pub mod intake;
