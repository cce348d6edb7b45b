pub mod backend;
pub mod composite;
pub mod cpu;
pub mod passes;
pub mod pipeline;
