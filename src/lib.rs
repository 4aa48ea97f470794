//! padsave: a durable save pipeline for text editors.
//!
//! The core is [`SaveRequest`], which writes a [`Document`] through a
//! pluggable storage backend ([`Vfs`]) using a two-stage protocol: content
//! is written in full to a staging file, then one atomic rename commits it.
//! An interrupted save never leaves partial content at the final path.
//!
//! Around that sit the pieces an embedding editor wires up: save policies
//! ([`SaveConfig`]), cooperative cancellation ([`CancelToken`]), status and
//! progress reporting ([`StatusSink`]), and change notification for file
//! watchers ([`ChangeNotifier`]).

pub mod buffer;
pub mod cancel;
pub mod config;
pub mod document;
pub mod error;
pub mod notify;
pub mod save;
pub mod status;
pub mod types;
pub mod vfs;

pub use buffer::Buffer;
pub use cancel::CancelToken;
pub use config::SaveConfig;
pub use document::Document;
pub use error::SaveError;
pub use notify::{ChangeNotifier, NullNotifier};
pub use save::SaveRequest;
pub use status::{NullStatus, StatusSink};
pub use types::{LineEnding, Marker};
pub use vfs::{Capabilities, FileInfo, LocalVfs, Vfs};
