pub mod data;
pub mod matching;
pub mod normalizer;
