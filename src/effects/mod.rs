pub mod fireworks;
pub mod particle;
