mod operations;
mod server;
