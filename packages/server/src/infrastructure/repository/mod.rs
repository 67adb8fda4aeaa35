//! Repository（Room Store）の実装
//!
//! - `inmemory`: HashMap を使ったインメモリ実装
//! - 将来的に: ネットワーク越しのドキュメントストア

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
