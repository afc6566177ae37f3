//! Meta-code: the flat member model the walker fills and the layout solver,
//! data writer and code generator read.

mod code;
mod layout;
mod value;


pub use code::MetaCode;
pub use layout::BITSET_WIDTH;
pub use value::MemberValue;
