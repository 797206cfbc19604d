mod applications;
mod common;
mod documents;
