pub mod engine;
pub mod replay;

pub use engine::{
    estimate_comparisons, Operation, Partition, Phase, SortProgress, SortState, Winner,
};
pub use replay::{pair_key, ranked_files, rebuild, DisplayPair, MatchLookup};
