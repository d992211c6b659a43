pub mod codec;
pub mod digest;
pub mod evaluator;
pub mod posting_list;

pub use codec::*;
pub use digest::*;
pub use evaluator::*;
pub use posting_list::*;
