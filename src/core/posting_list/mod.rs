mod fingerprint;
mod posting_list;

pub use fingerprint::{fingerprint, Fingerprint};
pub use posting_list::{LabeledPostings, PostingList};
