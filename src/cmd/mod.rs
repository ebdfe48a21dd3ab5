/// Textproto decode command.
pub mod decode;
/// Wire encoding dump command.
pub mod encode;
/// Message rendering for tree and JSON output.
pub mod render;
/// Schema summary command.
pub mod schema;
/// Shared input loading and output helpers.
pub mod util;
