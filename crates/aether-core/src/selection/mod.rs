//! Element selection bridge.
//!
//! Maps clicks in the rendered preview back to the `data-aether-id` tagged
//! element that produced them, and keeps the highlight in sync with the
//! session's selected element.

mod dom;
mod markup;

pub use dom::{AETHER_ID_ATTR, DomNode, NodeId, PreviewDom, ROOT};
