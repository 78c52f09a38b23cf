mod cache;
mod hierarchy;
mod line;
