pub mod composite;
pub mod consts;
pub mod diff;
pub mod engine;
pub mod error;
pub mod frame;
pub mod io;
pub mod mask;
pub mod masks;
pub mod ops;
pub mod output;
pub mod params;
pub mod pass;
pub mod pipeline;
