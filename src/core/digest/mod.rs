//! Online size distributions.
//!
//! Each codec owns one [`SizeDistribution`]: a [`TDigest`] for quantiles and
//! an exact running byte total.

mod centroid;
mod size_distribution;
mod t_digest;

pub use centroid::Centroid;
pub use size_distribution::SizeDistribution;
pub use t_digest::TDigest;
