pub mod builder;
pub mod sequence;
pub mod stripe;

pub use builder::{MaskBuilder, MaskSet};
pub use sequence::MaskSequence;
pub use stripe::{stripe_masks, stripe_response, StripeMasks};
