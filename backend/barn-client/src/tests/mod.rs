mod config;
mod encoder;
mod session;
mod support;
