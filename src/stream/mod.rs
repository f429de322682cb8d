pub mod decoder;
pub mod frame;

pub use decoder::{decode_stream, FrameDecoder};
pub use frame::{EventFrame, FrameKind, ResultPayload};
