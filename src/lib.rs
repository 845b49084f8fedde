pub mod platform;
pub mod error;
pub mod io_stream;
pub mod crypto;
pub mod iv_table;
pub mod codec;
pub mod header;
pub mod archive;

pub use platform::{Magic, Platform};
pub use error::{FastFileError, FormatError, Result};
pub use io_stream::{ByteOrder, ByteReader};
pub use crypto::KeyRegistry;
pub use iv_table::IvTable;
pub use codec::{CodecError, decode_section};
pub use header::Header;
pub use archive::{DecodeOptions, DecodeSummary, DecoderState, FastFileDecoder, decode_file};
