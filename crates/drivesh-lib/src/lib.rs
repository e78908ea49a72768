// drivesh-lib: storage backends, Drive session and shell for the drivesh binary

pub mod cli;
pub mod cloud;
pub mod commands;
pub mod config;
pub mod errors;
pub mod fileops;
pub mod http_client;
pub mod json;
pub mod logger;
pub mod output;
pub mod storage;
