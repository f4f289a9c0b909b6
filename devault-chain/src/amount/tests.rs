//! Tests for amounts

mod prop;
mod vectors;
