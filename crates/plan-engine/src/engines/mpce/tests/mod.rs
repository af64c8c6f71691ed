mod common;
mod plan;
mod validation;
