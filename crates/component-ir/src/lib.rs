//! Intermediate representation for component template lowering.
//!
//! A document is an arena of nodes ([`DocumentTree`]) rooted at a
//! namespace, class and render method. Front ends build it with
//! [`DocumentBuilder`], passes rewrite it in place through [`NodeRef`]
//! handles, and emitters read it through the [`Visitor`] contract.

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod lookup;
pub mod node;
pub mod options;
pub mod reference;
pub mod tree;
pub mod type_name;
pub mod walker;

pub use builder::{AttributeInput, DocumentBuilder, TagHandle, ValuePart};
pub use descriptor::{
    BindInfo, BoundAttribute, DescriptorKind, RequiredAttribute, TagDescriptor, TagMatchingRule,
    ANY_TAG,
};
pub use error::{TypeNameError, TypeNameResult};
pub use lookup::{DescriptorLookup, DescriptorSet, MemoizedLookup};
pub use node::*;
pub use options::{DocumentOptions, EmitMode};
pub use reference::NodeRef;
pub use tree::{DocumentTree, NodeData, NodeId};
pub use walker::{collect_refs, walk, walk_children, Visitor};
