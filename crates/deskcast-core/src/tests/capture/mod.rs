mod engine;
mod session;
mod source;
mod stream;
