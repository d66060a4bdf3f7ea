pub mod bridge;
pub mod completions;
pub mod config;
pub mod decode;
pub mod encode;
pub mod qci;
