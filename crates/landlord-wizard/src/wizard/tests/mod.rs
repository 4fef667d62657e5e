mod common;
mod flow;
mod sections;
