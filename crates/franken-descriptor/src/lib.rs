#![forbid(unsafe_code)]

//! Property descriptor classification, merging and resolution.
//!
//! - [`guard`]: strict shape checks for plain, value and accessor descriptors
//! - [`mapper`]: `only` / `omit` projections and the descriptor `merge` fold
//! - [`resolver`]: effective descriptor of a key on a target, existing or not
//! - [`object_model`]: the host objects descriptors describe

pub mod descriptor;
pub mod guard;
pub mod mapper;
pub mod object_model;
pub mod resolver;
pub mod structure;
pub mod value;

pub use descriptor::{Descriptor, DescriptorError};
pub use guard::{
    DescriptorKind, classify, is_accessor_descriptor, is_descriptor, is_plain_descriptor,
    is_value_descriptor,
};
pub use mapper::{merge, merge_all, omit, only};
pub use object_model::{ObjectError, ObjectHeap, PropertyDescriptor};
pub use resolver::{DescriptorResolver, ResolverConfig, ResolverContext, get};
pub use value::{Function, ObjectHandle, PropertyKey, Record, SymbolId, Value};
