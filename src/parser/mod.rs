pub mod fenced;
pub mod heuristic;
pub mod normalize;
pub mod strict;

pub use fenced::{extract_fenced_blocks, strip_outer_fence, FencedBlock};
pub use heuristic::{parse_heuristic, split_key_value, strip_bullet, LineGrammar, Section, SEPARATORS};
pub use normalize::{normalize, Diagnostic, NormalizeError, Normalized, Phase};
pub use strict::parse_strict;
