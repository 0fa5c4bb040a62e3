pub mod board;
pub mod game;
pub mod history;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod session;
pub mod sync;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
