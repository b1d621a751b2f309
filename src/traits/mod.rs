mod engine;

pub use engine::QueryEngine;
