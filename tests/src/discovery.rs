mod integration;
mod lifecycle;
