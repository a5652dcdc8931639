pub mod decimation;
pub mod filtering;
pub mod merge;
pub mod point;
