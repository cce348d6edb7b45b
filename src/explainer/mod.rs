pub mod graph;
pub mod mobject;
pub mod script;
pub mod space;
pub mod stage;
