pub mod decode;
pub mod dialect;
pub mod types;

pub use decode::{decode_argument, decode_node};
pub use dialect::{parse_ast, parse_line, to_standard_json};
pub use types::{ArgChar, Argument, Assignment, Construct, Node, Redirection};
