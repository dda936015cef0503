pub mod flow;
pub mod stopwatch;
