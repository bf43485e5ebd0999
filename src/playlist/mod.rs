pub mod dedup;
pub mod parser;
pub mod serializer;

pub use dedup::dedup_by_stream_url;
pub use parser::parse_playlist;
pub use serializer::{serialize_playlist, serialize_playlist_with_diagnostics};
