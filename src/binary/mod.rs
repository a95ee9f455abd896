//! In-memory structured payloads exchanged over the socket.
//!
//! A [`BinaryNode`] is a `{tag, attrs, content}` tree. The wire encoding of
//! these trees belongs to the transport; this module only provides the shape
//! and the lookup helpers used by request builders and response extractors.

mod node;

pub use node::{
    get_binary_node_child, get_binary_node_child_string, get_binary_node_children, BinaryNode,
    NodeContent,
};
